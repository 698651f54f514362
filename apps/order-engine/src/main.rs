//! Order Engine Binary
//!
//! Starts the HTTP API and the trigger monitor.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-engine
//! ```
//!
//! # Environment Variables
//!
//! - `ENGINE_CONFIG`: config file path (default: `config.yaml`; built-in
//!   defaults when the default path is absent)
//! - `RUST_LOG`: overrides `logging.level`

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use order_engine::application::services::TriggerMonitorService;
use order_engine::config::{Config, DEFAULT_CONFIG_PATH, load_config};
use order_engine::infrastructure::config::EngineContainer;
use order_engine::infrastructure::http::create_router;
use order_engine::observability::init_metrics;
use order_engine::telemetry::init_tracing;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// How long to wait for the monitor to finish its current pass.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = read_config()?;
    init_tracing(&config.logging).context("initializing tracing")?;

    tracing::info!(version = %config.server.version, "Starting order engine");
    log_config(&config);

    let metrics = if config.metrics.enabled {
        Some(init_metrics().context("installing Prometheus recorder")?)
    } else {
        None
    };

    let container = EngineContainer::from_config(&config);
    let shutdown_token = CancellationToken::new();

    let monitor = TriggerMonitorService::new(
        config.monitor.service_config(),
        Arc::new(container.monitor_triggers_use_case(config.monitor.settings())),
        shutdown_token.clone(),
    );
    let monitor_handle = monitor.start();

    let app = create_router(container.app_state(&config, metrics));
    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    shutdown_token.cancel();
    if let Some(handle) = monitor_handle {
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await {
            Ok(Ok(())) => tracing::info!("Trigger monitor stopped"),
            Ok(Err(e)) => tracing::error!(error = %e, "Trigger monitor task failed"),
            Err(_) => tracing::warn!(
                timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                "Trigger monitor did not stop in time"
            ),
        }
    }

    tracing::info!("Order engine stopped");
    Ok(())
}

fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

/// Load .env file from any ancestor directory.
fn load_dotenv_from_ancestors() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// An explicit `ENGINE_CONFIG` must exist; the default path may be absent.
fn read_config() -> anyhow::Result<Config> {
    match std::env::var("ENGINE_CONFIG") {
        Ok(path) => load_config(Some(&path)).with_context(|| format!("loading config from {path}")),
        Err(_) if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config(None).context("loading config.yaml")
        }
        Err(_) => Ok(Config::default()),
    }
}

fn log_config(config: &Config) {
    tracing::info!(
        http_port = config.server.http_port,
        unknown_account_policy = ?config.ledger.unknown_account_policy,
        starting_cash = %config.ledger.starting_cash,
        monitor_enabled = config.monitor.enabled,
        monitor_interval_secs = config.monitor.interval_secs,
        metrics_enabled = config.metrics.enabled,
        "Configuration loaded"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed; a process that cannot
/// observe termination signals should not start.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
