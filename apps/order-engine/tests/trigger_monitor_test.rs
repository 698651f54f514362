//! Trigger Monitor Integration Tests
//!
//! Conditional orders registered through the use cases, promoted to fills by
//! `MonitorTriggersUseCase` against the in-memory stores and a scripted feed.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use order_engine::application::use_cases::{
    CancelConditionalOrderUseCase, CreateConditionalOrderUseCase, ExecuteOrder,
    ExecuteOrderUseCase, MonitorSettings, MonitorTriggersUseCase,
};
use order_engine::domain::conditional_orders::{
    ConditionalOrder, ConditionalOrderRepository, ConditionalStatus, FillStatus,
    NewConditionalOrder, TriggerKind,
};
use order_engine::domain::ledger::{LedgerStore, UnknownAccountPolicy};
use order_engine::domain::shared::{AccountId, OrderSide, Symbol};
use order_engine::infrastructure::persistence::{
    InMemoryConditionalOrderRepository, InMemoryLedgerStore,
};
use order_engine::infrastructure::price_feed::MockPriceFeed;

type Monitor =
    MonitorTriggersUseCase<MockPriceFeed, InMemoryLedgerStore, InMemoryConditionalOrderRepository>;

struct Engine {
    ledger: Arc<InMemoryLedgerStore>,
    registry: Arc<InMemoryConditionalOrderRepository>,
    feed: Arc<MockPriceFeed>,
    executor: Arc<ExecuteOrderUseCase<InMemoryLedgerStore>>,
    create: CreateConditionalOrderUseCase<InMemoryLedgerStore, InMemoryConditionalOrderRepository>,
    cancel: Arc<CancelConditionalOrderUseCase<InMemoryConditionalOrderRepository>>,
    monitor: Arc<Monitor>,
}

fn engine(max_fill_attempts: u32) -> Engine {
    let ledger = Arc::new(InMemoryLedgerStore::new(UnknownAccountPolicy::AutoOpen {
        starting_cash: dec!(10000),
    }));
    let registry = Arc::new(InMemoryConditionalOrderRepository::new());
    let feed = Arc::new(MockPriceFeed::new());
    let executor = Arc::new(ExecuteOrderUseCase::new(Arc::clone(&ledger)));
    let monitor = Arc::new(MonitorTriggersUseCase::new(
        Arc::clone(&feed),
        Arc::clone(&executor),
        Arc::clone(&registry),
        MonitorSettings {
            price_timeout: Duration::from_millis(100),
            max_fill_attempts,
        },
    ));

    Engine {
        create: CreateConditionalOrderUseCase::new(Arc::clone(&ledger), Arc::clone(&registry)),
        cancel: Arc::new(CancelConditionalOrderUseCase::new(Arc::clone(&registry))),
        ledger,
        registry,
        feed,
        executor,
        monitor,
    }
}

fn account() -> AccountId {
    AccountId::new("acct-1")
}

impl Engine {
    async fn trade(&self, side: OrderSide, quantity: i64, price: Decimal) {
        self.executor
            .execute(ExecuteOrder::market(
                account(),
                Symbol::new("AAPL"),
                side,
                quantity,
                price,
            ))
            .await
            .unwrap();
    }

    async fn sell_stop(&self, kind: TriggerKind, stop: Decimal, trailing: Option<Decimal>) -> ConditionalOrder {
        self.create
            .create(NewConditionalOrder {
                account_id: account(),
                symbol: Symbol::new("AAPL"),
                side: OrderSide::Sell,
                kind,
                quantity: 10,
                reference_price: Some(dec!(175.50)),
                stop_price: stop,
                limit_price: None,
                trailing_percent: trailing,
            })
            .await
            .unwrap()
    }

    async fn stored(&self, order: &ConditionalOrder) -> ConditionalOrder {
        self.registry.find_by_id(order.id()).await.unwrap().unwrap()
    }

    async fn sells(&self) -> usize {
        self.ledger
            .executions(&account())
            .await
            .unwrap()
            .iter()
            .filter(|e| e.side() == OrderSide::Sell)
            .count()
    }
}

#[tokio::test]
async fn sell_stop_fills_at_observed_price() {
    let e = engine(5);
    e.trade(OrderSide::Buy, 10, dec!(175.50)).await;
    let order = e.sell_stop(TriggerKind::Stop, dec!(170), None).await;

    e.feed.set_price("AAPL", dec!(171));
    let report = e.monitor.run_tick().await;
    assert_eq!(report.triggered, 0);
    assert_eq!(e.stored(&order).await.status(), ConditionalStatus::Active);

    e.feed.set_price("AAPL", dec!(169));
    let report = e.monitor.run_tick().await;
    assert_eq!(report.triggered, 1);
    assert_eq!(report.filled, 1);

    let stored = e.stored(&order).await;
    assert_eq!(stored.status(), ConditionalStatus::Triggered);
    assert_eq!(stored.fill_price(), Some(dec!(169)));
    assert_eq!(stored.fill().map(|f| f.status), Some(FillStatus::Filled));

    let history = e.ledger.executions(&account()).await.unwrap();
    assert_eq!(history[0].quantity(), 10);
    assert_eq!(history[0].price(), dec!(169));
    assert_eq!(
        stored.fill().and_then(|f| f.execution_id.clone()).as_ref(),
        Some(history[0].id())
    );
    assert_eq!(e.ledger.get_balance(&account()).await.unwrap(), dec!(9935.00));

    let report = e.monitor.run_tick().await;
    assert_eq!(report.evaluated, 0);
    assert_eq!(e.sells().await, 1);
}

#[tokio::test]
async fn trailing_stop_ratchets_then_fires() {
    let e = engine(5);
    e.trade(OrderSide::Buy, 10, dec!(175.50)).await;
    let order = e
        .sell_stop(TriggerKind::TrailingStop, dec!(190), Some(dec!(5)))
        .await;

    e.feed.set_price("AAPL", dec!(210));
    let report = e.monitor.run_tick().await;
    assert_eq!(report.ratcheted, 1);
    assert_eq!(e.stored(&order).await.stop_price(), dec!(199.5));

    e.feed.set_price("AAPL", dec!(205));
    let report = e.monitor.run_tick().await;
    assert_eq!(report.ratcheted, 0);
    assert_eq!(report.triggered, 0);

    e.feed.set_price("AAPL", dec!(199));
    let report = e.monitor.run_tick().await;
    assert_eq!(report.triggered, 1);
    assert_eq!(e.stored(&order).await.fill_price(), Some(dec!(199)));
}

#[tokio::test]
async fn failed_fill_is_reconciled_on_a_later_pass() {
    let e = engine(5);
    e.trade(OrderSide::Buy, 10, dec!(175.50)).await;
    let order = e.sell_stop(TriggerKind::Stop, dec!(170), None).await;

    // Shares leave the account after the stop was accepted.
    e.trade(OrderSide::Sell, 10, dec!(175)).await;

    e.feed.set_price("AAPL", dec!(160));
    let report = e.monitor.run_tick().await;
    assert_eq!(report.triggered, 1);
    assert_eq!(report.fill_failures, 1);

    let stored = e.stored(&order).await;
    assert_eq!(stored.status(), ConditionalStatus::Triggered);
    let fill = stored.fill().unwrap();
    assert_eq!(fill.status, FillStatus::Pending);
    assert_eq!(fill.attempts, 1);
    assert!(fill.last_error.as_deref().unwrap().contains("AAPL"));

    e.trade(OrderSide::Buy, 10, dec!(150)).await;
    e.feed.set_price("AAPL", dec!(100));
    let report = e.monitor.run_tick().await;
    assert_eq!(report.reconciled, 1);
    assert_eq!(report.triggered, 0);

    let history = e.ledger.executions(&account()).await.unwrap();
    assert_eq!(history[0].price(), dec!(160));
    assert_eq!(
        e.stored(&order).await.fill().map(|f| f.status),
        Some(FillStatus::Filled)
    );
}

#[tokio::test]
async fn fill_retries_stop_at_the_attempt_limit() {
    let e = engine(2);
    e.trade(OrderSide::Buy, 10, dec!(175.50)).await;
    let order = e.sell_stop(TriggerKind::Stop, dec!(170), None).await;
    e.trade(OrderSide::Sell, 10, dec!(175)).await;

    e.feed.set_price("AAPL", dec!(160));
    let mut failures = 0;
    for _ in 0..4 {
        failures += e.monitor.run_tick().await.fill_failures;
    }

    assert_eq!(failures, 2);
    let stored = e.stored(&order).await;
    assert_eq!(stored.fill().map(|f| f.attempts), Some(2));
    assert_eq!(stored.fill().map(|f| f.status), Some(FillStatus::Pending));
    assert_eq!(e.sells().await, 1);
}

#[tokio::test]
async fn cancelled_order_never_fills() {
    let e = engine(5);
    e.trade(OrderSide::Buy, 10, dec!(175.50)).await;
    let order = e.sell_stop(TriggerKind::Stop, dec!(170), None).await;

    e.cancel.cancel(&account(), order.id()).await.unwrap();
    e.feed.set_price("AAPL", dec!(150));
    let report = e.monitor.run_tick().await;

    assert_eq!(report.evaluated, 0);
    assert_eq!(e.sells().await, 0);
    assert_eq!(e.stored(&order).await.status(), ConditionalStatus::Cancelled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancel_racing_the_monitor_has_one_outcome() {
    for _ in 0..25 {
        let e = engine(5);
        e.trade(OrderSide::Buy, 10, dec!(175.50)).await;
        let order = e.sell_stop(TriggerKind::Stop, dec!(170), None).await;
        e.feed.set_price("AAPL", dec!(169));

        let monitor = Arc::clone(&e.monitor);
        let tick = tokio::spawn(async move { monitor.run_tick().await });
        let cancel = Arc::clone(&e.cancel);
        let id = order.id().clone();
        let cancelled = tokio::spawn(async move { cancel.cancel(&account(), &id).await });

        let report = tick.await.unwrap();
        let cancelled = cancelled.await.unwrap().is_ok();
        let stored = e.stored(&order).await;

        if cancelled {
            assert_eq!(stored.status(), ConditionalStatus::Cancelled);
            assert_eq!(report.triggered, 0);
            assert_eq!(e.sells().await, 0);
        } else {
            assert_eq!(stored.status(), ConditionalStatus::Triggered);
            assert_eq!(report.triggered, 1);
            assert_eq!(e.sells().await, 1);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_passes_fill_once() {
    let e = engine(5);
    e.trade(OrderSide::Buy, 10, dec!(175.50)).await;
    e.sell_stop(TriggerKind::Stop, dec!(170), None).await;
    e.feed.set_price("AAPL", dec!(169));

    let passes: Vec<_> = (0..4)
        .map(|_| {
            let monitor = Arc::clone(&e.monitor);
            tokio::spawn(async move { monitor.run_tick().await })
        })
        .collect();

    let mut triggered = 0;
    for pass in passes {
        triggered += pass.await.unwrap().triggered;
    }

    assert_eq!(triggered, 1);
    assert_eq!(e.sells().await, 1);
}
