//! Create Conditional Order Use Case

use std::sync::Arc;

use chrono::Utc;

use crate::domain::conditional_orders::{
    ConditionalOrder, ConditionalOrderError, ConditionalOrderRepository, NewConditionalOrder,
};
use crate::domain::ledger::LedgerStore;
use crate::domain::shared::OrderSide;
use crate::observability;

/// Use case for submitting stop, stop-limit and trailing-stop orders.
pub struct CreateConditionalOrderUseCase<L, R>
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
{
    ledger: Arc<L>,
    registry: Arc<R>,
}

impl<L, R> CreateConditionalOrderUseCase<L, R>
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
{
    /// Create a new `CreateConditionalOrderUseCase`.
    pub const fn new(ledger: Arc<L>, registry: Arc<R>) -> Self {
        Self { ledger, registry }
    }

    /// Validate and register a conditional order.
    ///
    /// Sell-side orders are checked against the shares held right now. The
    /// check is a snapshot: no shares are reserved, so the holding can change
    /// before the trigger fires.
    ///
    /// # Errors
    ///
    /// [`ConditionalOrderError::InvalidOrder`] for malformed input,
    /// [`ConditionalOrderError::InsufficientShares`] for an uncovered sell, or
    /// a ledger error when the account cannot be read.
    pub async fn create(
        &self,
        new: NewConditionalOrder,
    ) -> Result<ConditionalOrder, ConditionalOrderError> {
        let order = ConditionalOrder::create(new, Utc::now())?;

        let position = self
            .ledger
            .get_position(order.account_id(), order.symbol())
            .await?;
        if order.side() == OrderSide::Sell && position.shares < order.quantity() {
            return Err(ConditionalOrderError::InsufficientShares {
                symbol: order.symbol().clone(),
                held: position.shares,
                requested: order.quantity(),
            });
        }

        self.registry.insert(order.clone()).await?;

        tracing::info!(
            order_id = %order.id(),
            account_id = %order.account_id(),
            symbol = %order.symbol(),
            side = %order.side(),
            kind = %order.kind(),
            quantity = order.quantity(),
            stop_price = %order.stop_price(),
            "Conditional order registered"
        );
        observability::record_conditional_order_created(order.kind().as_str());

        Ok(order)
    }
}
