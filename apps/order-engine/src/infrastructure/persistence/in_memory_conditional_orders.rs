//! In-memory conditional order registry.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::domain::conditional_orders::{
    ConditionalOrder, ConditionalOrderError, ConditionalOrderRepository, ConditionalStatus,
    Ratcheted,
};
use crate::domain::shared::{AccountId, ConditionalOrderId, ExecutionId};

/// In-memory implementation of [`ConditionalOrderRepository`].
///
/// Transitions run under the write lock, so the status check and the update
/// are one step.
#[derive(Debug, Default)]
pub struct InMemoryConditionalOrderRepository {
    orders: RwLock<HashMap<ConditionalOrderId, ConditionalOrder>>,
}

impl InMemoryConditionalOrderRepository {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders, any status.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }

    fn update<T>(
        &self,
        id: &ConditionalOrderId,
        apply: impl FnOnce(&mut ConditionalOrder) -> Result<T, ConditionalOrderError>,
    ) -> Result<(T, ConditionalOrder), ConditionalOrderError> {
        let mut orders = self.orders.write();
        let order = orders
            .get_mut(id)
            .ok_or_else(|| ConditionalOrderError::NotFound { id: id.clone() })?;
        let out = apply(order)?;
        Ok((out, order.clone()))
    }

    fn collect(&self, keep: impl Fn(&ConditionalOrder) -> bool) -> Vec<ConditionalOrder> {
        let mut matched: Vec<ConditionalOrder> =
            self.orders.read().values().filter(|o| keep(o)).cloned().collect();
        matched.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });
        matched
    }
}

#[async_trait]
impl ConditionalOrderRepository for InMemoryConditionalOrderRepository {
    async fn insert(&self, order: ConditionalOrder) -> Result<ConditionalOrderId, ConditionalOrderError> {
        let id = order.id().clone();
        let mut orders = self.orders.write();
        if orders.contains_key(&id) {
            return Err(ConditionalOrderError::Storage {
                message: format!("duplicate conditional order id {id}"),
            });
        }
        orders.insert(id.clone(), order);
        Ok(id)
    }

    async fn find_by_id(
        &self,
        id: &ConditionalOrderId,
    ) -> Result<Option<ConditionalOrder>, ConditionalOrderError> {
        Ok(self.orders.read().get(id).cloned())
    }

    async fn list_active(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<ConditionalOrder>, ConditionalOrderError> {
        Ok(self.collect(|o| o.status() == ConditionalStatus::Active && o.is_owned_by(account_id)))
    }

    async fn list_all_active(&self) -> Result<Vec<ConditionalOrder>, ConditionalOrderError> {
        Ok(self.collect(|o| o.status() == ConditionalStatus::Active))
    }

    async fn list_unfilled(&self) -> Result<Vec<ConditionalOrder>, ConditionalOrderError> {
        let mut pending = self.collect(ConditionalOrder::is_awaiting_fill);
        pending.sort_by_key(ConditionalOrder::triggered_at);
        Ok(pending)
    }

    async fn cancel(&self, id: &ConditionalOrderId) -> Result<ConditionalOrder, ConditionalOrderError> {
        self.update(id, ConditionalOrder::cancel).map(|((), order)| order)
    }

    async fn mark_triggered(
        &self,
        id: &ConditionalOrderId,
        fill_price: Decimal,
        at: DateTime<Utc>,
    ) -> Result<ConditionalOrder, ConditionalOrderError> {
        self.update(id, |order| order.trigger(fill_price, at))
            .map(|((), order)| order)
    }

    async fn ratchet_stop(
        &self,
        id: &ConditionalOrderId,
        new_stop: Decimal,
    ) -> Result<Ratcheted, ConditionalOrderError> {
        self.update(id, |order| Ok(order.ratchet_stop(new_stop)))
            .map(|(moved, order)| Ratcheted { moved, order })
    }

    async fn begin_fill(&self, id: &ConditionalOrderId) -> Result<ConditionalOrder, ConditionalOrderError> {
        self.update(id, ConditionalOrder::begin_fill).map(|((), order)| order)
    }

    async fn complete_fill(
        &self,
        id: &ConditionalOrderId,
        execution_id: &ExecutionId,
    ) -> Result<ConditionalOrder, ConditionalOrderError> {
        self.update(id, |order| order.complete_fill(execution_id.clone()))
            .map(|((), order)| order)
    }

    async fn fail_fill(
        &self,
        id: &ConditionalOrderId,
        reason: &str,
    ) -> Result<ConditionalOrder, ConditionalOrderError> {
        self.update(id, |order| order.fail_fill(reason))
            .map(|((), order)| order)
    }
}
