//! Configuration for the order engine.
//!
//! YAML with `${VAR}` / `${VAR:-default}` environment interpolation. Every
//! section is optional and falls back to its defaults.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_engine::config::load_config;
//!
//! let config = load_config(Some("config.yaml"))?;
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod ledger;
mod monitor;
mod observability;
mod price_feed;
mod server;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ledger::{LedgerConfig, UnknownAccountMode};
pub use monitor::MonitorConfig;
pub use observability::{LogFormat, LoggingConfig, MetricsConfig};
pub use price_feed::{PriceFeedConfig, PriceFeedKind};
pub use server::ServerConfig;

/// Default config file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server.
    #[serde(default)]
    pub server: ServerConfig,
    /// Ledger defaults.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Trigger monitor.
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Price feed.
    #[serde(default)]
    pub price_feed: PriceFeedConfig,
    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Prometheus metrics.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to `config.yaml`.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = if interpolated.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. Unset or empty
/// variables without a default become the empty string.
#[allow(clippy::expect_used)] // Regex is a compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.http_port == 0 {
        return Err(ConfigError::ValidationError(
            "server.http_port must be between 1 and 65535".to_string(),
        ));
    }

    if config.ledger.starting_cash <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "ledger.starting_cash must be positive".to_string(),
        ));
    }

    if config.monitor.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "monitor.interval_secs must be positive".to_string(),
        ));
    }

    if config.monitor.price_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "monitor.price_timeout_ms must be positive".to_string(),
        ));
    }

    if config.monitor.max_fill_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "monitor.max_fill_attempts must be at least 1".to_string(),
        ));
    }

    let feed = &config.price_feed;
    if feed.volatility_percent < Decimal::ZERO || feed.volatility_percent >= Decimal::ONE_HUNDRED {
        return Err(ConfigError::ValidationError(
            "price_feed.volatility_percent must be in [0, 100)".to_string(),
        ));
    }

    if feed.default_price <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "price_feed.default_price must be positive".to_string(),
        ));
    }

    if let Some((symbol, _)) = feed.base_prices.iter().find(|(_, p)| **p <= Decimal::ZERO) {
        return Err(ConfigError::ValidationError(format!(
            "price_feed.base_prices.{symbol} must be positive"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::ledger::UnknownAccountPolicy;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.ledger.starting_cash, dec!(10000));
        assert_eq!(config.ledger.unknown_account_policy, UnknownAccountMode::AutoOpen);
        assert!(config.monitor.enabled);
        assert_eq!(config.monitor.interval_secs, 10);
        assert_eq!(config.monitor.startup_delay_secs, 5);
        assert_eq!(config.price_feed.base_prices["AAPL"], dec!(175.50));
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = load_config_from_string("").unwrap();
        assert_eq!(config.server.http_port, 8080);
    }

    #[test]
    fn test_load_partial_config() {
        let yaml = r"
ledger:
  starting_cash: 2500
  unknown_account_policy: reject
monitor:
  interval_secs: 3
";

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load partial config: {e}"),
        };
        assert_eq!(config.ledger.policy(), UnknownAccountPolicy::Reject);
        assert_eq!(config.monitor.interval_secs, 3);
        assert_eq!(config.monitor.price_timeout_ms, 2000);
        assert_eq!(config.server.http_port, 8080);
    }

    #[test]
    fn test_auto_open_policy_carries_starting_cash() {
        let yaml = r"
ledger:
  starting_cash: 2500
";
        let config = load_config_from_string(yaml).unwrap();
        assert_eq!(
            config.ledger.policy(),
            UnknownAccountPolicy::AutoOpen {
                starting_cash: dec!(2500)
            }
        );
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "port: ${ORDER_ENGINE_TEST_NONEXISTENT_VAR:-9090}";
        assert_eq!(interpolate_env_vars(input), "port: 9090");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "version: ${ORDER_ENGINE_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "version: ");
    }

    #[test]
    fn test_validation_zero_interval() {
        let yaml = r"
monitor:
  interval_secs: 0
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero interval");
        };
        assert!(err.to_string().contains("interval_secs"));
    }

    #[test]
    fn test_validation_non_positive_starting_cash() {
        let yaml = r"
ledger:
  starting_cash: 0
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero starting cash");
        };
        assert!(err.to_string().contains("starting_cash"));
    }

    #[test]
    fn test_validation_port_zero() {
        let yaml = r"
server:
  http_port: 0
";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let yaml = r"
ledger:
  unknown_account_policy: maybe
";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  http_port: 9000\nlogging:\n  level: debug\n  format: json"
        )
        .unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.server.http_port, 9000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = load_config_from_string(include_str!("../../config.yaml")).unwrap();
        assert_eq!(config.price_feed.base_prices.len(), 5);
        assert_eq!(config.monitor.max_fill_attempts, 5);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = load_config(Some("/nonexistent/order-engine.yaml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}
