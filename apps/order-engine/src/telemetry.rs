//! Tracing Setup
//!
//! Console logging through `tracing-subscriber`. Filter directives come from
//! `logging.level` unless `RUST_LOG` is set.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_engine::telemetry::init_tracing;
//!
//! init_tracing(&config.logging)?;
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Tracing initialization failure.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter directives do not parse.
    #[error("invalid log filter '{directives}': {message}")]
    InvalidFilter {
        /// Offending directives.
        directives: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Build the filter: `RUST_LOG` when set, otherwise `logging.level`.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| TelemetryError::InvalidFilter {
        directives: config.level.clone(),
        message: e.to_string(),
    })
}

/// Install the global subscriber.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match config.format {
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .try_init()
            .map_err(|e| TelemetryError::Install(e.to_string())),
        LogFormat::Pretty => builder
            .with_target(true)
            .try_init()
            .map_err(|e| TelemetryError::Install(e.to_string())),
    }
}
