//! Dependency Injection Container
//!
//! Stores and the price feed are built once and shared by every use case the
//! container hands out.

use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::application::ports::PriceFeedPort;
use crate::application::use_cases::{
    CancelConditionalOrderUseCase, CreateConditionalOrderUseCase, ExecuteOrderUseCase,
    GetPortfolioUseCase, MonitorSettings, MonitorTriggersUseCase,
};
use crate::config::{Config, PriceFeedKind};
use crate::domain::conditional_orders::ConditionalOrderRepository;
use crate::domain::ledger::LedgerStore;
use crate::infrastructure::http::AppState;
use crate::infrastructure::persistence::{InMemoryConditionalOrderRepository, InMemoryLedgerStore};
use crate::infrastructure::price_feed::SimulatedPriceFeed;

/// Container wired with the in-memory stores and the simulated feed.
pub type EngineContainer =
    Container<InMemoryLedgerStore, InMemoryConditionalOrderRepository, SimulatedPriceFeed>;

/// Dependency injection container.
pub struct Container<L, R, P>
where
    L: LedgerStore + 'static,
    R: ConditionalOrderRepository + 'static,
    P: PriceFeedPort + 'static,
{
    ledger: Arc<L>,
    registry: Arc<R>,
    price_feed: Arc<P>,
    executor: Arc<ExecuteOrderUseCase<L>>,
}

impl<L, R, P> Container<L, R, P>
where
    L: LedgerStore + 'static,
    R: ConditionalOrderRepository + 'static,
    P: PriceFeedPort + 'static,
{
    /// Create a new container with all dependencies.
    pub fn new(ledger: Arc<L>, registry: Arc<R>, price_feed: Arc<P>) -> Self {
        let executor = Arc::new(ExecuteOrderUseCase::new(Arc::clone(&ledger)));
        Self {
            ledger,
            registry,
            price_feed,
            executor,
        }
    }

    /// Get the ledger store.
    pub fn ledger(&self) -> Arc<L> {
        Arc::clone(&self.ledger)
    }

    /// Get the conditional order registry.
    pub fn registry(&self) -> Arc<R> {
        Arc::clone(&self.registry)
    }

    /// Get the price feed.
    pub fn price_feed(&self) -> Arc<P> {
        Arc::clone(&self.price_feed)
    }

    /// The shared `ExecuteOrderUseCase`.
    pub fn execute_order_use_case(&self) -> Arc<ExecuteOrderUseCase<L>> {
        Arc::clone(&self.executor)
    }

    /// Create a `CreateConditionalOrderUseCase`.
    pub fn create_conditional_order_use_case(&self) -> CreateConditionalOrderUseCase<L, R> {
        CreateConditionalOrderUseCase::new(Arc::clone(&self.ledger), Arc::clone(&self.registry))
    }

    /// Create a `CancelConditionalOrderUseCase`.
    pub fn cancel_conditional_order_use_case(&self) -> CancelConditionalOrderUseCase<R> {
        CancelConditionalOrderUseCase::new(Arc::clone(&self.registry))
    }

    /// Create a `GetPortfolioUseCase`.
    pub fn get_portfolio_use_case(&self, price_timeout: Duration) -> GetPortfolioUseCase<L, P> {
        GetPortfolioUseCase::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.price_feed),
            price_timeout,
        )
    }

    /// Create a `MonitorTriggersUseCase` sharing the API's executor.
    pub fn monitor_triggers_use_case(
        &self,
        settings: MonitorSettings,
    ) -> MonitorTriggersUseCase<P, L, R> {
        MonitorTriggersUseCase::new(
            Arc::clone(&self.price_feed),
            Arc::clone(&self.executor),
            Arc::clone(&self.registry),
            settings,
        )
    }

    /// Build the HTTP state.
    pub fn app_state(
        &self,
        config: &Config,
        metrics: Option<PrometheusHandle>,
    ) -> AppState<L, R, P> {
        let price_timeout = config.monitor.price_timeout();
        AppState {
            execute_order: self.execute_order_use_case(),
            create_conditional_order: Arc::new(self.create_conditional_order_use_case()),
            cancel_conditional_order: Arc::new(self.cancel_conditional_order_use_case()),
            get_portfolio: Arc::new(self.get_portfolio_use_case(price_timeout)),
            ledger: self.ledger(),
            registry: self.registry(),
            price_feed: self.price_feed(),
            price_timeout,
            starting_cash: config.ledger.starting_cash,
            metrics,
            version: config.server.version.clone(),
        }
    }
}

impl EngineContainer {
    /// Wire the in-memory stores and the configured feed.
    pub fn from_config(config: &Config) -> Self {
        let ledger = Arc::new(InMemoryLedgerStore::new(config.ledger.policy()));
        let registry = Arc::new(InMemoryConditionalOrderRepository::new());
        let price_feed = match config.price_feed.kind {
            PriceFeedKind::Simulated => Arc::new(SimulatedPriceFeed::new(
                config.price_feed.base_prices.clone(),
                config.price_feed.default_price,
                config.price_feed.volatility_percent,
            )),
        };

        tracing::info!(
            policy = ?config.ledger.policy(),
            feed = ?config.price_feed.kind,
            "Container wired"
        );
        Self::new(ledger, registry, price_feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::UnknownAccountPolicy;
    use crate::domain::shared::{AccountId, OrderSide, Symbol};
    use crate::application::use_cases::ExecuteOrder;
    use crate::infrastructure::price_feed::MockPriceFeed;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn use_cases_share_one_ledger() {
        let container = Container::new(
            Arc::new(InMemoryLedgerStore::new(UnknownAccountPolicy::AutoOpen {
                starting_cash: dec!(10000),
            })),
            Arc::new(InMemoryConditionalOrderRepository::new()),
            Arc::new(MockPriceFeed::new()),
        );

        let account = AccountId::new("acct-1");
        container
            .execute_order_use_case()
            .execute(ExecuteOrder::market(
                account.clone(),
                Symbol::new("AAPL"),
                OrderSide::Buy,
                10,
                dec!(175.50),
            ))
            .await
            .unwrap();

        let portfolio = container
            .get_portfolio_use_case(Duration::from_millis(50))
            .get(&account)
            .await
            .unwrap();
        assert_eq!(portfolio.cash_balance, dec!(8245.00));
        assert_eq!(container.ledger().account_count(), 1);
    }

    #[test]
    fn from_config_honours_policy() {
        let mut config = Config::default();
        config.ledger.unknown_account_policy = crate::config::UnknownAccountMode::Reject;

        let container = EngineContainer::from_config(&config);
        assert_eq!(container.ledger().policy(), UnknownAccountPolicy::Reject);
    }
}
