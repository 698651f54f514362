//! Position value object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Symbol;

/// Shares held in one symbol with a single blended average cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Instrument held.
    pub symbol: Symbol,
    /// Shares held.
    pub shares: i64,
    /// Weighted average price paid per share.
    pub avg_cost: Decimal,
}

impl Position {
    /// Position opened by a first buy.
    #[must_use]
    pub const fn opened(symbol: Symbol, shares: i64, price: Decimal) -> Self {
        Self {
            symbol,
            shares,
            avg_cost: price,
        }
    }

    /// The "no position" value: zero shares at zero cost.
    #[must_use]
    pub const fn flat(symbol: Symbol) -> Self {
        Self {
            symbol,
            shares: 0,
            avg_cost: Decimal::ZERO,
        }
    }

    /// Whether any shares are held.
    #[must_use]
    pub const fn is_flat(&self) -> bool {
        self.shares == 0
    }

    /// Total paid for the shares still held, or `None` past the decimal range.
    #[must_use]
    pub fn cost_basis(&self) -> Option<Decimal> {
        self.avg_cost.checked_mul(Decimal::from(self.shares))
    }

    /// Value of the holding at `price`, saturating at the decimal range.
    #[must_use]
    pub fn market_value(&self, price: Decimal) -> Decimal {
        price.saturating_mul(Decimal::from(self.shares))
    }

    /// The position after buying `qty` more shares at `price`, with the
    /// average cost re-blended. `None` when the share count or the cost
    /// basis would leave the representable range.
    #[must_use]
    pub(super) fn with_added(&self, qty: i64, price: Decimal) -> Option<Self> {
        let shares = self.shares.checked_add(qty)?;
        let avg_cost = self
            .cost_basis()?
            .checked_add(price.checked_mul(Decimal::from(qty))?)?
            .checked_div(Decimal::from(shares))?;
        Some(Self {
            symbol: self.symbol.clone(),
            shares,
            avg_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn adding_shares_blends_average_cost() {
        let position = Position::opened(Symbol::new("AAPL"), 10, dec!(175.50))
            .with_added(5, dec!(180.00))
            .unwrap();

        assert_eq!(position.shares, 15);
        assert_eq!(position.avg_cost, dec!(177.00));
        assert_eq!(position.cost_basis(), Some(dec!(2655.00)));
    }

    #[test]
    fn share_count_overflow_is_refused() {
        let position = Position::opened(Symbol::new("AAPL"), i64::MAX, Decimal::new(1, 28));
        assert_eq!(position.with_added(2, Decimal::new(1, 28)), None);
    }

    #[test]
    fn cost_basis_overflow_is_refused() {
        let position = Position::opened(Symbol::new("AAPL"), 2, Decimal::MAX / dec!(4));
        assert_eq!(position.with_added(1, Decimal::MAX), None);
    }

    #[test]
    fn market_value_saturates() {
        let position = Position::opened(Symbol::new("AAPL"), i64::MAX, dec!(1));
        assert_eq!(position.market_value(Decimal::MAX), Decimal::MAX);
    }

    #[test]
    fn flat_position_reports_zeroes() {
        let position = Position::flat(Symbol::new("MSFT"));
        assert!(position.is_flat());
        assert_eq!(position.avg_cost, Decimal::ZERO);
        assert_eq!(position.market_value(dec!(330.80)), Decimal::ZERO);
    }
}
