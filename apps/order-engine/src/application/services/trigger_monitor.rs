//! Trigger Monitor Service
//!
//! Runs [`MonitorTriggersUseCase::run_tick`] on a fixed interval until the
//! shutdown token is cancelled. Cancellation is only observed between passes,
//! so a pass that has started always finishes.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::application::ports::PriceFeedPort;
use crate::application::use_cases::MonitorTriggersUseCase;
use crate::domain::conditional_orders::ConditionalOrderRepository;
use crate::domain::ledger::LedgerStore;

/// Scheduling for the trigger monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerMonitorConfig {
    /// Whether the monitor runs at all.
    pub enabled: bool,
    /// Time between passes.
    pub interval: Duration,
    /// Wait before the first pass.
    pub startup_delay: Duration,
}

impl Default for TriggerMonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(10),
            startup_delay: Duration::from_secs(5),
        }
    }
}

/// Background task driving the trigger monitor.
pub struct TriggerMonitorService<P, L, R>
where
    P: PriceFeedPort + 'static,
    L: LedgerStore + 'static,
    R: ConditionalOrderRepository + 'static,
{
    config: TriggerMonitorConfig,
    use_case: Arc<MonitorTriggersUseCase<P, L, R>>,
    shutdown: CancellationToken,
}

impl<P, L, R> TriggerMonitorService<P, L, R>
where
    P: PriceFeedPort + 'static,
    L: LedgerStore + 'static,
    R: ConditionalOrderRepository + 'static,
{
    /// Create a new trigger monitor service.
    #[must_use]
    pub const fn new(
        config: TriggerMonitorConfig,
        use_case: Arc<MonitorTriggersUseCase<P, L, R>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            use_case,
            shutdown,
        }
    }

    /// Spawn the monitoring loop. Returns `None` when disabled.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            tracing::info!("Trigger monitor disabled");
            return None;
        }

        let use_case = Arc::clone(&self.use_case);
        let shutdown = self.shutdown.clone();
        let config = self.config;

        tracing::info!(
            interval_ms = config.interval.as_millis() as u64,
            startup_delay_ms = config.startup_delay.as_millis() as u64,
            "Starting trigger monitor"
        );

        Some(tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(config.startup_delay) => {}
                () = shutdown.cancelled() => {
                    tracing::info!("Trigger monitor cancelled before first pass");
                    return;
                }
            }

            let mut interval = tokio::time::interval(config.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let report = use_case.run_tick().await;
                        if report.triggered > 0 || report.fill_failures > 0 || report.reconciled > 0 {
                            tracing::info!(
                                triggered = report.triggered,
                                filled = report.filled,
                                reconciled = report.reconciled,
                                fill_failures = report.fill_failures,
                                "Trigger pass produced activity"
                            );
                        }
                    }
                    () = shutdown.cancelled() => {
                        tracing::info!("Trigger monitor shutting down");
                        break;
                    }
                }
            }
        }))
    }
}
