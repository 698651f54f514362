//! Conditional order repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{ConditionalOrder, ConditionalOrderError};
use crate::domain::shared::{AccountId, ConditionalOrderId, ExecutionId};

/// Result of a ratchet attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ratcheted {
    /// Whether this call changed the stop.
    pub moved: bool,
    /// Stored order as of the attempt.
    pub order: ConditionalOrder,
}

/// Registry of conditional orders.
///
/// Every state change is a conditional update on the stored order: the
/// transition is checked and applied atomically, so two actors racing on the
/// same order cannot both succeed.
#[async_trait]
pub trait ConditionalOrderRepository: Send + Sync {
    /// Store a newly created order.
    async fn insert(&self, order: ConditionalOrder) -> Result<ConditionalOrderId, ConditionalOrderError>;

    /// Look up an order.
    async fn find_by_id(
        &self,
        id: &ConditionalOrderId,
    ) -> Result<Option<ConditionalOrder>, ConditionalOrderError>;

    /// Active orders for one account, oldest first.
    async fn list_active(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<ConditionalOrder>, ConditionalOrderError>;

    /// Active orders across all accounts, oldest first.
    async fn list_all_active(&self) -> Result<Vec<ConditionalOrder>, ConditionalOrderError>;

    /// Triggered orders whose fill is pending, oldest trigger first.
    async fn list_unfilled(&self) -> Result<Vec<ConditionalOrder>, ConditionalOrderError>;

    /// `active → cancelled`.
    ///
    /// # Errors
    ///
    /// [`ConditionalOrderError::NotFound`] or [`ConditionalOrderError::AlreadyTerminal`].
    async fn cancel(&self, id: &ConditionalOrderId) -> Result<ConditionalOrder, ConditionalOrderError>;

    /// `active → triggered`, recording the trigger time and price.
    ///
    /// # Errors
    ///
    /// [`ConditionalOrderError::AlreadyTerminal`] when another actor moved the
    /// order first. This is the at-most-once guard.
    async fn mark_triggered(
        &self,
        id: &ConditionalOrderId,
        fill_price: Decimal,
        at: DateTime<Utc>,
    ) -> Result<ConditionalOrder, ConditionalOrderError>;

    /// Move a trailing stop in the holder's favour. The returned order is the
    /// stored copy after the attempt, whether or not this call moved it.
    async fn ratchet_stop(
        &self,
        id: &ConditionalOrderId,
        new_stop: Decimal,
    ) -> Result<Ratcheted, ConditionalOrderError>;

    /// Claim the post-trigger fill.
    async fn begin_fill(&self, id: &ConditionalOrderId) -> Result<ConditionalOrder, ConditionalOrderError>;

    /// Release the claim as filled, linking the execution.
    async fn complete_fill(
        &self,
        id: &ConditionalOrderId,
        execution_id: &ExecutionId,
    ) -> Result<ConditionalOrder, ConditionalOrderError>;

    /// Release the claim after a failed fill attempt.
    async fn fail_fill(
        &self,
        id: &ConditionalOrderId,
        reason: &str,
    ) -> Result<ConditionalOrder, ConditionalOrderError>;
}
