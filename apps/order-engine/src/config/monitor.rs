//! Trigger monitor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::services::TriggerMonitorConfig;
use crate::application::use_cases::MonitorSettings;

/// Trigger monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Run the background monitor.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between passes.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Seconds to wait before the first pass.
    #[serde(default = "default_startup_delay_secs")]
    pub startup_delay_secs: u64,
    /// Upper bound on one price lookup, in milliseconds.
    #[serde(default = "default_price_timeout_ms")]
    pub price_timeout_ms: u64,
    /// Failed fill attempts before a triggered order is left to an operator.
    #[serde(default = "default_max_fill_attempts")]
    pub max_fill_attempts: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
            startup_delay_secs: default_startup_delay_secs(),
            price_timeout_ms: default_price_timeout_ms(),
            max_fill_attempts: default_max_fill_attempts(),
        }
    }
}

impl MonitorConfig {
    /// Price lookup bound.
    #[must_use]
    pub const fn price_timeout(&self) -> Duration {
        Duration::from_millis(self.price_timeout_ms)
    }

    /// Scheduling for the background service.
    #[must_use]
    pub const fn service_config(&self) -> TriggerMonitorConfig {
        TriggerMonitorConfig {
            enabled: self.enabled,
            interval: Duration::from_secs(self.interval_secs),
            startup_delay: Duration::from_secs(self.startup_delay_secs),
        }
    }

    /// Per-pass tuning.
    #[must_use]
    pub const fn settings(&self) -> MonitorSettings {
        MonitorSettings {
            price_timeout: self.price_timeout(),
            max_fill_attempts: self.max_fill_attempts,
        }
    }
}

pub(crate) const fn default_true() -> bool {
    true
}

const fn default_interval_secs() -> u64 {
    10
}

const fn default_startup_delay_secs() -> u64 {
    5
}

const fn default_price_timeout_ms() -> u64 {
    2000
}

const fn default_max_fill_attempts() -> u32 {
    5
}
