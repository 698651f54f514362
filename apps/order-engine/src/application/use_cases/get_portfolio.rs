//! Get Portfolio Use Case
//!
//! Read-only view of an account: cash, positions valued at the current feed
//! price, and totals.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::application::ports::PriceFeedPort;
use crate::domain::ledger::{LedgerError, LedgerStore, Position};
use crate::domain::shared::{AccountId, Symbol};

/// One position with its valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    /// Instrument.
    pub symbol: Symbol,
    /// Shares held.
    pub shares: i64,
    /// Blended average cost.
    pub avg_cost: Decimal,
    /// Price used for valuation.
    pub current_price: Decimal,
    /// `current_price * shares`, saturating at the decimal range.
    pub market_value: Decimal,
    /// False when the feed had no price and the position is valued at cost.
    pub priced: bool,
}

/// Account portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    /// Account.
    pub account_id: AccountId,
    /// Cash balance.
    pub cash_balance: Decimal,
    /// Valued positions ordered by symbol.
    pub positions: Vec<PositionValuation>,
    /// Sum of position market values.
    pub total_value: Decimal,
    /// Cash plus position value.
    pub total_assets: Decimal,
}

/// Use case for reading an account's portfolio.
pub struct GetPortfolioUseCase<L, P>
where
    L: LedgerStore,
    P: PriceFeedPort,
{
    ledger: Arc<L>,
    price_feed: Arc<P>,
    price_timeout: Duration,
}

impl<L, P> GetPortfolioUseCase<L, P>
where
    L: LedgerStore,
    P: PriceFeedPort,
{
    /// Create a new `GetPortfolioUseCase`.
    pub const fn new(ledger: Arc<L>, price_feed: Arc<P>, price_timeout: Duration) -> Self {
        Self {
            ledger,
            price_feed,
            price_timeout,
        }
    }

    /// Build the portfolio view from a consistent ledger snapshot.
    ///
    /// # Errors
    ///
    /// Ledger errors only; price feed failures fall back to average cost.
    pub async fn get(&self, account_id: &AccountId) -> Result<PortfolioView, LedgerError> {
        let snapshot = self.ledger.snapshot(account_id).await?;

        let mut positions = Vec::with_capacity(snapshot.positions.len());
        for position in snapshot.positions {
            positions.push(self.value(position).await);
        }

        let total_value = positions
            .iter()
            .fold(Decimal::ZERO, |total, p| total.saturating_add(p.market_value));
        Ok(PortfolioView {
            account_id: snapshot.account_id,
            cash_balance: snapshot.cash,
            positions,
            total_value,
            total_assets: snapshot.cash.saturating_add(total_value),
        })
    }

    async fn value(&self, position: Position) -> PositionValuation {
        let lookup = tokio::time::timeout(self.price_timeout, self.price_feed.get_price(&position.symbol)).await;
        let (current_price, priced) = match lookup {
            Ok(Ok(price)) => (price, true),
            Ok(Err(e)) => {
                tracing::debug!(symbol = %position.symbol, error = %e, "Valuing position at cost");
                (position.avg_cost, false)
            }
            Err(_) => {
                tracing::debug!(symbol = %position.symbol, "Price lookup timed out, valuing position at cost");
                (position.avg_cost, false)
            }
        };

        PositionValuation {
            market_value: position.market_value(current_price),
            symbol: position.symbol,
            shares: position.shares,
            avg_cost: position.avg_cost,
            current_price,
            priced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::UnknownAccountPolicy;
    use crate::domain::order_execution::{Execution, OrderType};
    use crate::domain::shared::OrderSide;
    use crate::infrastructure::persistence::InMemoryLedgerStore;
    use crate::infrastructure::price_feed::MockPriceFeed;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    async fn buy(ledger: &InMemoryLedgerStore, symbol: &str, shares: i64, price: Decimal) {
        let fill = Execution::filled(
            AccountId::new("acct-1"),
            Symbol::new(symbol),
            OrderSide::Buy,
            OrderType::Market,
            shares,
            price,
            Utc::now(),
        );
        ledger.apply_buy(&fill).await.unwrap();
    }

    #[tokio::test]
    async fn values_positions_at_feed_price() {
        let ledger = Arc::new(InMemoryLedgerStore::new(UnknownAccountPolicy::AutoOpen {
            starting_cash: dec!(10000),
        }));
        let feed = Arc::new(MockPriceFeed::new());
        buy(&ledger, "AAPL", 10, dec!(175.50)).await;
        buy(&ledger, "MSFT", 2, dec!(330)).await;
        feed.set_price("AAPL", dec!(180));
        feed.fail_symbol("MSFT");

        let use_case = GetPortfolioUseCase::new(Arc::clone(&ledger), feed, Duration::from_millis(50));
        let view = use_case.get(&AccountId::new("acct-1")).await.unwrap();

        assert_eq!(view.cash_balance, dec!(7585.00));
        assert_eq!(view.positions.len(), 2);
        assert_eq!(view.positions[0].symbol, Symbol::new("AAPL"));
        assert_eq!(view.positions[0].market_value, dec!(1800));
        assert!(view.positions[0].priced);
        assert_eq!(view.positions[1].market_value, dec!(660));
        assert!(!view.positions[1].priced);
        assert_eq!(view.total_value, dec!(2460));
        assert_eq!(view.total_assets, dec!(10045.00));
    }

    #[tokio::test]
    async fn empty_account_is_all_cash() {
        let ledger = Arc::new(InMemoryLedgerStore::new(UnknownAccountPolicy::AutoOpen {
            starting_cash: dec!(10000),
        }));
        let use_case = GetPortfolioUseCase::new(
            ledger,
            Arc::new(MockPriceFeed::new()),
            Duration::from_millis(50),
        );

        let view = use_case.get(&AccountId::new("fresh")).await.unwrap();

        assert!(view.positions.is_empty());
        assert_eq!(view.total_value, Decimal::ZERO);
        assert_eq!(view.total_assets, dec!(10000));
    }
}
