//! Monitor Triggers Use Case
//!
//! One pass of the trigger monitor: retry fills left behind by earlier
//! passes, price every active conditional order, fire the ones whose
//! predicate holds and hand the resulting market instruction to the
//! execution use case.
//!
//! A trigger is committed before its fill is attempted. If the fill fails the
//! order stays `triggered` with a pending fill, and later passes retry it at
//! the recorded trigger price until it fills or the attempt limit is reached.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::task::JoinSet;

use super::{ExecuteOrder, ExecuteOrderUseCase, FillSource};
use crate::application::ports::{PriceFeedError, PriceFeedPort};
use crate::domain::conditional_orders::{
    ConditionalOrder, ConditionalOrderError, ConditionalOrderRepository, TriggerDecision,
    TriggerEvaluator,
};
use crate::domain::ledger::LedgerStore;
use crate::domain::order_execution::OrderType;
use crate::domain::shared::Symbol;
use crate::observability;

/// Tuning for a monitor pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Upper bound on a single price lookup.
    pub price_timeout: Duration,
    /// Failed fill attempts after which a triggered order is left for an operator.
    pub max_fill_attempts: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            price_timeout: Duration::from_secs(2),
            max_fill_attempts: 5,
        }
    }
}

/// Counters for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Active orders that had a price and were evaluated.
    pub evaluated: usize,
    /// Active orders skipped because their price was unavailable.
    pub skipped: usize,
    /// Trailing stops that moved.
    pub ratcheted: usize,
    /// Orders this pass moved to `triggered`.
    pub triggered: usize,
    /// Trigger attempts that lost to a cancel or another pass.
    pub lost_races: usize,
    /// Fills completed for orders triggered in this pass.
    pub filled: usize,
    /// Fills completed for orders triggered in an earlier pass.
    pub reconciled: usize,
    /// Fill attempts that failed.
    pub fill_failures: usize,
}

enum FillOutcome {
    Filled,
    Failed,
    Skipped,
}

/// Use case for one trigger monitor pass.
pub struct MonitorTriggersUseCase<P, L, R>
where
    P: PriceFeedPort + 'static,
    L: LedgerStore,
    R: ConditionalOrderRepository,
{
    price_feed: Arc<P>,
    executor: Arc<ExecuteOrderUseCase<L>>,
    registry: Arc<R>,
    settings: MonitorSettings,
}

impl<P, L, R> MonitorTriggersUseCase<P, L, R>
where
    P: PriceFeedPort + 'static,
    L: LedgerStore,
    R: ConditionalOrderRepository,
{
    /// Create a new `MonitorTriggersUseCase`.
    pub const fn new(
        price_feed: Arc<P>,
        executor: Arc<ExecuteOrderUseCase<L>>,
        registry: Arc<R>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            price_feed,
            executor,
            registry,
            settings,
        }
    }

    /// Run one pass. Never fails: every problem is logged and counted.
    pub async fn run_tick(&self) -> TickReport {
        let started = Instant::now();
        let mut report = TickReport::default();

        self.reconcile(&mut report).await;

        let orders = match self.registry.list_all_active().await {
            Ok(orders) => orders,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load active conditional orders");
                return report;
            }
        };

        if !orders.is_empty() {
            let prices = self.fetch_prices(&orders).await;
            for order in orders {
                let Some(&price) = prices.get(order.symbol()) else {
                    report.skipped += 1;
                    continue;
                };
                report.evaluated += 1;
                self.evaluate(order, price, &mut report).await;
            }
        }

        observability::record_tick(started.elapsed(), report.evaluated);
        tracing::debug!(?report, elapsed_ms = started.elapsed().as_millis() as u64, "Trigger pass complete");
        report
    }

    /// Retry fills for orders triggered in earlier passes.
    async fn reconcile(&self, report: &mut TickReport) {
        let unfilled = match self.registry.list_unfilled().await {
            Ok(orders) => orders,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load unfilled triggered orders");
                return;
            }
        };

        for order in unfilled {
            let attempts = order.fill().map_or(0, |fill| fill.attempts);
            if attempts >= self.settings.max_fill_attempts {
                continue;
            }
            let Some(price) = order.fill_price() else {
                continue;
            };

            tracing::info!(
                order_id = %order.id(),
                attempts,
                price = %price,
                "Retrying fill for triggered order"
            );
            if matches!(self.fill(&order, price, report).await, FillOutcome::Filled) {
                report.reconciled += 1;
            }
        }
    }

    /// One lookup per distinct symbol, run concurrently, each bounded by the
    /// price timeout. Symbols whose lookup failed are absent from the map.
    async fn fetch_prices(&self, orders: &[ConditionalOrder]) -> HashMap<Symbol, Decimal> {
        let mut symbols: Vec<Symbol> = orders.iter().map(|o| o.symbol().clone()).collect();
        symbols.sort();
        symbols.dedup();

        let timeout = self.settings.price_timeout;
        let mut lookups = JoinSet::new();
        for symbol in symbols {
            let feed = Arc::clone(&self.price_feed);
            lookups.spawn(async move {
                let result = match tokio::time::timeout(timeout, feed.get_price(&symbol)).await {
                    Ok(result) => result,
                    Err(_) => Err(PriceFeedError::Timeout {
                        symbol: symbol.clone(),
                        timeout_ms: timeout.as_millis() as u64,
                    }),
                };
                (symbol, result)
            });
        }

        let mut prices = HashMap::new();
        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((symbol, Ok(price))) => {
                    prices.insert(symbol, price);
                }
                Ok((symbol, Err(e))) => {
                    tracing::debug!(symbol = %symbol, error = %e, "Price unavailable, skipping this pass");
                    observability::record_price_feed_error();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Price lookup task failed");
                    observability::record_price_feed_error();
                }
            }
        }
        prices
    }

    async fn evaluate(&self, mut order: ConditionalOrder, price: Decimal, report: &mut TickReport) {
        if let Some(new_stop) = TriggerEvaluator::ratchet(&order, price) {
            match self.registry.ratchet_stop(order.id(), new_stop).await {
                Ok(ratcheted) => {
                    if ratcheted.moved {
                        report.ratcheted += 1;
                        tracing::debug!(
                            order_id = %order.id(),
                            stop_price = %new_stop,
                            "Trailing stop moved"
                        );
                    }
                    // Another pass may have moved the stored stop further.
                    order = ratcheted.order;
                }
                Err(e) => {
                    tracing::warn!(order_id = %order.id(), error = %e, "Failed to move trailing stop");
                }
            }
        }

        let TriggerDecision::Fire { price } = TriggerEvaluator::evaluate(&order, price) else {
            return;
        };

        let triggered = match self.registry.mark_triggered(order.id(), price, Utc::now()).await {
            Ok(triggered) => triggered,
            Err(ConditionalOrderError::AlreadyTerminal { status, .. }) => {
                report.lost_races += 1;
                tracing::debug!(order_id = %order.id(), %status, "Order left active before trigger");
                return;
            }
            Err(e) => {
                tracing::warn!(order_id = %order.id(), error = %e, "Failed to mark order triggered");
                return;
            }
        };

        report.triggered += 1;
        observability::record_trigger(triggered.kind().as_str());
        tracing::info!(
            order_id = %triggered.id(),
            account_id = %triggered.account_id(),
            symbol = %triggered.symbol(),
            kind = %triggered.kind(),
            stop_price = %triggered.stop_price(),
            price = %price,
            "Conditional order triggered"
        );

        if matches!(self.fill(&triggered, price, report).await, FillOutcome::Filled) {
            report.filled += 1;
        }
    }

    /// Claim, execute and record the fill for a triggered order.
    async fn fill(&self, order: &ConditionalOrder, price: Decimal, report: &mut TickReport) -> FillOutcome {
        let claimed = match self.registry.begin_fill(order.id()).await {
            Ok(claimed) => claimed,
            Err(
                e @ (ConditionalOrderError::FillInProgress { .. }
                | ConditionalOrderError::AlreadyFilled { .. }),
            ) => {
                tracing::debug!(order_id = %order.id(), reason = %e, "Fill already handled");
                return FillOutcome::Skipped;
            }
            Err(e) => {
                tracing::warn!(order_id = %order.id(), error = %e, "Failed to claim fill");
                return FillOutcome::Skipped;
            }
        };

        let instruction = ExecuteOrder {
            account_id: claimed.account_id().clone(),
            symbol: claimed.symbol().clone(),
            side: claimed.side(),
            order_type: OrderType::Market,
            quantity: claimed.quantity(),
            price,
            source: FillSource::Trigger,
        };

        match self.executor.execute(instruction).await {
            Ok(execution) => {
                if let Err(e) = self.registry.complete_fill(claimed.id(), execution.id()).await {
                    tracing::error!(
                        order_id = %claimed.id(),
                        execution_id = %execution.id(),
                        error = %e,
                        "Execution applied but not linked to its conditional order"
                    );
                }
                FillOutcome::Filled
            }
            Err(e) => {
                report.fill_failures += 1;
                observability::record_fill_anomaly();

                let attempts = match self.registry.fail_fill(claimed.id(), &e.to_string()).await {
                    Ok(updated) => updated.fill().map_or(0, |fill| fill.attempts),
                    Err(release_err) => {
                        tracing::error!(
                            order_id = %claimed.id(),
                            error = %release_err,
                            "Failed to release fill claim"
                        );
                        0
                    }
                };

                tracing::error!(
                    order_id = %claimed.id(),
                    account_id = %claimed.account_id(),
                    symbol = %claimed.symbol(),
                    side = %claimed.side(),
                    quantity = claimed.quantity(),
                    price = %price,
                    attempts,
                    error = %e,
                    "Triggered order could not be filled"
                );
                if attempts >= self.settings.max_fill_attempts {
                    tracing::error!(
                        order_id = %claimed.id(),
                        attempts,
                        "Giving up on fill; order stays triggered and unfilled"
                    );
                }
                FillOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conditional_orders::{
        ConditionalStatus, FillStatus, NewConditionalOrder, TriggerKind,
    };
    use crate::domain::ledger::UnknownAccountPolicy;
    use crate::domain::order_execution::Execution;
    use crate::domain::shared::{AccountId, OrderSide};
    use crate::infrastructure::persistence::{
        InMemoryConditionalOrderRepository, InMemoryLedgerStore,
    };
    use crate::infrastructure::price_feed::MockPriceFeed;
    use rust_decimal_macros::dec;

    struct Fixture {
        feed: Arc<MockPriceFeed>,
        ledger: Arc<InMemoryLedgerStore>,
        registry: Arc<InMemoryConditionalOrderRepository>,
        monitor: MonitorTriggersUseCase<MockPriceFeed, InMemoryLedgerStore, InMemoryConditionalOrderRepository>,
    }

    fn fixture() -> Fixture {
        let feed = Arc::new(MockPriceFeed::new());
        let ledger = Arc::new(InMemoryLedgerStore::new(UnknownAccountPolicy::AutoOpen {
            starting_cash: dec!(10000),
        }));
        let registry = Arc::new(InMemoryConditionalOrderRepository::new());
        let executor = Arc::new(ExecuteOrderUseCase::new(Arc::clone(&ledger)));
        let monitor = MonitorTriggersUseCase::new(
            Arc::clone(&feed),
            executor,
            Arc::clone(&registry),
            MonitorSettings {
                price_timeout: Duration::from_millis(50),
                max_fill_attempts: 2,
            },
        );
        Fixture {
            feed,
            ledger,
            registry,
            monitor,
        }
    }

    fn account() -> AccountId {
        AccountId::new("acct-1")
    }

    async fn buy(ledger: &InMemoryLedgerStore, symbol: &str, shares: i64, price: Decimal) {
        let fill = Execution::filled(
            account(),
            Symbol::new(symbol),
            OrderSide::Buy,
            OrderType::Market,
            shares,
            price,
            Utc::now(),
        );
        ledger.apply_buy(&fill).await.unwrap();
    }

    async fn register(
        registry: &InMemoryConditionalOrderRepository,
        kind: TriggerKind,
        side: OrderSide,
        stop: Decimal,
        limit: Option<Decimal>,
        trailing: Option<Decimal>,
    ) -> ConditionalOrder {
        let order = ConditionalOrder::create(
            NewConditionalOrder {
                account_id: account(),
                symbol: Symbol::new("AAPL"),
                side,
                kind,
                quantity: 10,
                reference_price: None,
                stop_price: stop,
                limit_price: limit,
                trailing_percent: trailing,
            },
            Utc::now(),
        )
        .unwrap();
        registry.insert(order.clone()).await.unwrap();
        order
    }

    #[tokio::test]
    async fn sell_stop_triggers_and_fills_at_observed_price() {
        let f = fixture();
        buy(&f.ledger, "AAPL", 10, dec!(175.50)).await;
        let order = register(&f.registry, TriggerKind::Stop, OrderSide::Sell, dec!(170), None, None).await;
        f.feed.set_price("AAPL", dec!(169));

        let report = f.monitor.run_tick().await;

        assert_eq!(report.triggered, 1);
        assert_eq!(report.filled, 1);
        let stored = f.registry.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), ConditionalStatus::Triggered);
        assert_eq!(stored.fill_price(), Some(dec!(169)));
        assert_eq!(stored.fill().unwrap().status, FillStatus::Filled);

        let history = f.ledger.executions(&account()).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].side(), OrderSide::Sell);
        assert_eq!(history[0].quantity(), 10);
        assert_eq!(history[0].price(), dec!(169));
        assert_eq!(
            stored.fill().unwrap().execution_id.as_ref(),
            Some(history[0].id())
        );
        assert_eq!(f.ledger.get_balance(&account()).await.unwrap(), dec!(9935.00));
    }

    #[tokio::test]
    async fn price_above_sell_stop_holds() {
        let f = fixture();
        buy(&f.ledger, "AAPL", 10, dec!(175.50)).await;
        register(&f.registry, TriggerKind::Stop, OrderSide::Sell, dec!(170), None, None).await;
        f.feed.set_price("AAPL", dec!(171));

        let report = f.monitor.run_tick().await;

        assert_eq!(report.evaluated, 1);
        assert_eq!(report.triggered, 0);
        assert_eq!(f.registry.list_all_active().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn feed_failure_skips_order_until_next_pass() {
        let f = fixture();
        buy(&f.ledger, "AAPL", 10, dec!(175.50)).await;
        register(&f.registry, TriggerKind::Stop, OrderSide::Sell, dec!(170), None, None).await;
        f.feed.fail_symbol("AAPL");

        let report = f.monitor.run_tick().await;
        assert_eq!(report.skipped, 1);
        assert_eq!(report.triggered, 0);

        f.feed.set_price("AAPL", dec!(160));
        let report = f.monitor.run_tick().await;
        assert_eq!(report.triggered, 1);
    }

    #[tokio::test]
    async fn stalled_lookup_times_out_without_blocking_other_symbols() {
        let f = fixture();
        buy(&f.ledger, "AAPL", 10, dec!(175.50)).await;
        buy(&f.ledger, "MSFT", 10, dec!(330)).await;
        register(&f.registry, TriggerKind::Stop, OrderSide::Sell, dec!(170), None, None).await;
        let msft = ConditionalOrder::create(
            NewConditionalOrder {
                account_id: account(),
                symbol: Symbol::new("MSFT"),
                side: OrderSide::Sell,
                kind: TriggerKind::Stop,
                quantity: 10,
                reference_price: None,
                stop_price: dec!(320),
                limit_price: None,
                trailing_percent: None,
            },
            Utc::now(),
        )
        .unwrap();
        f.registry.insert(msft).await.unwrap();

        f.feed.stall_symbol("AAPL", Duration::from_secs(5));
        f.feed.set_price("MSFT", dec!(300));

        let report = f.monitor.run_tick().await;

        assert_eq!(report.skipped, 1);
        assert_eq!(report.triggered, 1);
        assert_eq!(report.filled, 1);
    }

    #[tokio::test]
    async fn stop_limit_gapping_through_limit_does_not_fire() {
        let f = fixture();
        buy(&f.ledger, "AAPL", 10, dec!(175.50)).await;
        register(
            &f.registry,
            TriggerKind::StopLimit,
            OrderSide::Sell,
            dec!(170),
            Some(dec!(165)),
            None,
        )
        .await;

        f.feed.set_price("AAPL", dec!(160));
        assert_eq!(f.monitor.run_tick().await.triggered, 0);

        f.feed.set_price("AAPL", dec!(167));
        assert_eq!(f.monitor.run_tick().await.triggered, 1);
    }

    #[tokio::test]
    async fn trailing_stop_ratchets_then_fires_on_pullback() {
        let f = fixture();
        buy(&f.ledger, "AAPL", 10, dec!(175.50)).await;
        let order = register(
            &f.registry,
            TriggerKind::TrailingStop,
            OrderSide::Sell,
            dec!(170),
            None,
            Some(dec!(5)),
        )
        .await;

        f.feed.set_price("AAPL", dec!(200));
        let report = f.monitor.run_tick().await;
        assert_eq!(report.ratcheted, 1);
        assert_eq!(report.triggered, 0);
        let stored = f.registry.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.stop_price(), dec!(190));

        f.feed.set_price("AAPL", dec!(189));
        let report = f.monitor.run_tick().await;
        assert_eq!(report.triggered, 1);
        assert_eq!(report.filled, 1);
    }

    #[tokio::test]
    async fn stale_snapshot_is_evaluated_against_stored_stop() {
        let f = fixture();
        buy(&f.ledger, "AAPL", 10, dec!(175.50)).await;
        let stale = register(
            &f.registry,
            TriggerKind::TrailingStop,
            OrderSide::Sell,
            dec!(170),
            None,
            Some(dec!(5)),
        )
        .await;

        // An overlapping pass saw 210 and already moved the stop to 199.5.
        let moved = f.registry.ratchet_stop(stale.id(), dec!(199.5)).await.unwrap();
        assert!(moved.moved);

        // 199 * 0.95 = 189.05 is below the stored stop, so nothing moves here,
        // but 199 is through the stored stop and must fire.
        let mut report = TickReport::default();
        f.monitor.evaluate(stale, dec!(199), &mut report).await;

        assert_eq!(report.ratcheted, 0);
        assert_eq!(report.triggered, 1);
        assert_eq!(report.filled, 1);
        let history = f.ledger.executions(&account()).await.unwrap();
        assert_eq!(history[0].price(), dec!(199));
    }

    #[tokio::test]
    async fn failed_fill_stays_triggered_and_is_reconciled_later() {
        let f = fixture();
        buy(&f.ledger, "AAPL", 10, dec!(175.50)).await;
        let order = register(&f.registry, TriggerKind::Stop, OrderSide::Sell, dec!(170), None, None).await;

        // Shares sold elsewhere after the stop was accepted.
        let sold = Execution::filled(
            account(),
            Symbol::new("AAPL"),
            OrderSide::Sell,
            OrderType::Market,
            10,
            dec!(172),
            Utc::now(),
        );
        f.ledger.apply_sell(&sold).await.unwrap();

        f.feed.set_price("AAPL", dec!(169));
        let report = f.monitor.run_tick().await;
        assert_eq!(report.triggered, 1);
        assert_eq!(report.fill_failures, 1);

        let stored = f.registry.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), ConditionalStatus::Triggered);
        assert!(stored.is_awaiting_fill());
        assert_eq!(stored.fill().unwrap().attempts, 1);

        // Shares come back; the next pass fills at the trigger price.
        buy(&f.ledger, "AAPL", 10, dec!(150)).await;
        f.feed.set_price("AAPL", dec!(500));
        let report = f.monitor.run_tick().await;
        assert_eq!(report.reconciled, 1);
        assert_eq!(report.triggered, 0);

        let history = f.ledger.executions(&account()).await.unwrap();
        assert_eq!(history[0].price(), dec!(169));
        let stored = f.registry.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.fill().unwrap().status, FillStatus::Filled);
    }

    #[tokio::test]
    async fn reconciliation_stops_after_max_attempts() {
        let f = fixture();
        let order = register(&f.registry, TriggerKind::Stop, OrderSide::Buy, dec!(170), None, None).await;

        // 10 shares at 2000 is beyond the 10000 starting cash.
        f.feed.set_price("AAPL", dec!(2000));
        let report = f.monitor.run_tick().await;
        assert_eq!(report.fill_failures, 1);

        let report = f.monitor.run_tick().await;
        assert_eq!(report.fill_failures, 1);

        let report = f.monitor.run_tick().await;
        assert_eq!(report.fill_failures, 0);

        let stored = f.registry.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.fill().unwrap().attempts, 2);
        assert!(f.ledger.executions(&account()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelled_order_is_never_triggered() {
        let f = fixture();
        buy(&f.ledger, "AAPL", 10, dec!(175.50)).await;
        let order = register(&f.registry, TriggerKind::Stop, OrderSide::Sell, dec!(170), None, None).await;
        f.registry.cancel(order.id()).await.unwrap();
        f.feed.set_price("AAPL", dec!(100));

        let report = f.monitor.run_tick().await;

        assert_eq!(report.evaluated, 0);
        assert_eq!(f.ledger.executions(&account()).await.unwrap().len(), 1);
    }
}
