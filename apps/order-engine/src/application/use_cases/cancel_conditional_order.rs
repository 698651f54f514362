//! Cancel Conditional Order Use Case

use std::sync::Arc;

use crate::domain::conditional_orders::{
    ConditionalOrder, ConditionalOrderError, ConditionalOrderRepository,
};
use crate::domain::shared::{AccountId, ConditionalOrderId};

/// Use case for cancelling an active conditional order.
pub struct CancelConditionalOrderUseCase<R>
where
    R: ConditionalOrderRepository,
{
    registry: Arc<R>,
}

impl<R> CancelConditionalOrderUseCase<R>
where
    R: ConditionalOrderRepository,
{
    /// Create a new `CancelConditionalOrderUseCase`.
    pub const fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }

    /// Cancel `id` on behalf of `account_id`.
    ///
    /// Orders belonging to another account are reported as not found.
    ///
    /// # Errors
    ///
    /// [`ConditionalOrderError::NotFound`] or, when the trigger monitor (or an
    /// earlier cancel) got there first, [`ConditionalOrderError::AlreadyTerminal`].
    pub async fn cancel(
        &self,
        account_id: &AccountId,
        id: &ConditionalOrderId,
    ) -> Result<ConditionalOrder, ConditionalOrderError> {
        let order = self
            .registry
            .find_by_id(id)
            .await?
            .filter(|order| order.is_owned_by(account_id))
            .ok_or_else(|| ConditionalOrderError::NotFound { id: id.clone() })?;

        let cancelled = self.registry.cancel(order.id()).await?;

        tracing::info!(
            order_id = %id,
            account_id = %account_id,
            symbol = %cancelled.symbol(),
            "Conditional order cancelled"
        );
        Ok(cancelled)
    }
}
