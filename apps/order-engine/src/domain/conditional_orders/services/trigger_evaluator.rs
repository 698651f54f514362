//! Trigger Evaluator Domain Service
//!
//! Pure trigger predicates and the trailing-stop ratchet. The monitor calls
//! [`TriggerEvaluator::ratchet`] first and then [`TriggerEvaluator::evaluate`]
//! against the resulting stop price.

use rust_decimal::Decimal;

use crate::domain::conditional_orders::{ConditionalOrder, TriggerKind};
use crate::domain::shared::OrderSide;

/// Decimal places kept on a ratcheted stop price.
const RATCHET_SCALE: u32 = 4;

/// Outcome of checking one price against one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    /// Price has not crossed the trigger.
    Hold,
    /// Trigger crossed; fill at `price`.
    Fire {
        /// Observed price.
        price: Decimal,
    },
}

impl TriggerDecision {
    /// Whether the order should fire.
    #[must_use]
    pub const fn fires(&self) -> bool {
        matches!(self, Self::Fire { .. })
    }
}

/// Stateless trigger logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerEvaluator;

impl TriggerEvaluator {
    /// Evaluate `price` against an order's current stop and limit.
    #[must_use]
    pub fn evaluate(order: &ConditionalOrder, price: Decimal) -> TriggerDecision {
        Self::check(
            order.kind(),
            order.side(),
            order.stop_price(),
            order.limit_price(),
            price,
        )
    }

    /// Raw predicate.
    ///
    /// | kind              | sell                       | buy                        |
    /// |-------------------|----------------------------|----------------------------|
    /// | stop, trailing    | `price <= stop`            | `price >= stop`            |
    /// | stop-limit        | `stop >= price >= limit`   | `stop <= price <= limit`   |
    #[must_use]
    pub fn check(
        kind: TriggerKind,
        side: OrderSide,
        stop: Decimal,
        limit: Option<Decimal>,
        price: Decimal,
    ) -> TriggerDecision {
        let fires = match (kind, side) {
            (TriggerKind::Stop | TriggerKind::TrailingStop, OrderSide::Sell) => price <= stop,
            (TriggerKind::Stop | TriggerKind::TrailingStop, OrderSide::Buy) => price >= stop,
            (TriggerKind::StopLimit, OrderSide::Sell) => {
                limit.is_some_and(|limit| price <= stop && price >= limit)
            }
            (TriggerKind::StopLimit, OrderSide::Buy) => {
                limit.is_some_and(|limit| price >= stop && price <= limit)
            }
        };

        if fires {
            TriggerDecision::Fire { price }
        } else {
            TriggerDecision::Hold
        }
    }

    /// New stop price for a trailing-stop order after observing `price`, if
    /// the stop should move.
    ///
    /// Sell orders trail below the price and only move up; buy orders trail
    /// above the price and only move down. Orders without a trailing percent
    /// behave as plain stops.
    #[must_use]
    pub fn ratchet(order: &ConditionalOrder, price: Decimal) -> Option<Decimal> {
        if order.kind() != TriggerKind::TrailingStop {
            return None;
        }
        let pct = order.trailing_percent()? / Decimal::ONE_HUNDRED;

        match order.side() {
            OrderSide::Sell => {
                let candidate = price.checked_mul(Decimal::ONE - pct)?.round_dp(RATCHET_SCALE);
                (candidate > order.stop_price()).then_some(candidate)
            }
            OrderSide::Buy => {
                let candidate = price.checked_mul(Decimal::ONE + pct)?.round_dp(RATCHET_SCALE);
                (candidate < order.stop_price()).then_some(candidate)
            }
        }
    }
}
