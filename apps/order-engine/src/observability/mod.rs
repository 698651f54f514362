//! Observability module: Prometheus metrics for fills, rejections and the
//! trigger monitor.

mod metrics;

pub use metrics::{
    MetricsError, init_metrics, record_conditional_order_created, record_fill,
    record_fill_anomaly, record_order_rejection, record_price_feed_error, record_tick,
    record_trigger,
};
