//! Application Services
//!
//! Long-running background tasks.

mod trigger_monitor;

pub use trigger_monitor::{TriggerMonitorConfig, TriggerMonitorService};
