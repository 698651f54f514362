//! Prometheus metrics for the order engine.
//!
//! Recording functions are safe to call before [`init_metrics`]; without an
//! installed recorder they are no-ops.

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Tick duration buckets from 1ms to 30s.
const TICK_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure the exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install the global recorder.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

/// Install the Prometheus recorder.
///
/// The returned handle renders the exposition text; the HTTP layer serves it
/// at `/metrics`.
///
/// # Errors
///
/// Fails if a recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .set_buckets(TICK_BUCKETS)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!("Prometheus metrics recorder installed");
    Ok(handle)
}

// ============================================================================
// Execution
// ============================================================================

/// Count a completed fill.
///
/// * `side` - "buy" or "sell"
/// * `source` - "api" for caller-submitted orders, "trigger" for monitor fills
pub fn record_fill(side: &str, source: &str) {
    counter!(
        "engine_fills_total",
        "side" => side.to_string(),
        "source" => source.to_string()
    )
    .increment(1);
}

/// Count a rejected instruction by error code.
pub fn record_order_rejection(code: &str) {
    counter!("engine_orders_rejected_total", "code" => code.to_string()).increment(1);
}

// ============================================================================
// Conditional orders
// ============================================================================

/// Count an accepted conditional order.
pub fn record_conditional_order_created(kind: &str) {
    counter!("engine_conditional_orders_created_total", "kind" => kind.to_string()).increment(1);
}

/// Count a conditional order that fired.
pub fn record_trigger(kind: &str) {
    counter!("engine_conditional_triggers_total", "kind" => kind.to_string()).increment(1);
}

/// Count a triggered order whose fill failed.
pub fn record_fill_anomaly() {
    counter!("engine_fill_anomalies_total").increment(1);
}

// ============================================================================
// Trigger monitor
// ============================================================================

/// Count a failed or timed-out price lookup.
pub fn record_price_feed_error() {
    counter!("engine_price_feed_errors_total").increment(1);
}

/// Record one monitor tick.
pub fn record_tick(duration: Duration, evaluated: usize) {
    histogram!("engine_tick_duration_seconds").record(duration.as_secs_f64());
    counter!("engine_tick_orders_evaluated_total").increment(evaluated as u64);
}
