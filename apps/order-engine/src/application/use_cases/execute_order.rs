//! Execute Order Use Case
//!
//! The single path by which fills reach the ledger. Caller-submitted orders
//! and trigger-generated orders both come through here.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::ledger::LedgerStore;
use crate::domain::order_execution::{Execution, ExecutionError, FillTerms, OrderType};
use crate::domain::shared::{AccountId, OrderSide, Symbol};
use crate::error::ErrorCode;
use crate::observability;

/// Who asked for the fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillSource {
    /// Submitted through the API.
    #[default]
    Api,
    /// Synthesized by the trigger monitor.
    Trigger,
}

impl FillSource {
    /// Metric label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Trigger => "trigger",
        }
    }
}

/// A buy or sell instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteOrder {
    /// Account to fill against.
    pub account_id: AccountId,
    /// Instrument.
    pub symbol: Symbol,
    /// Buy or sell.
    pub side: OrderSide,
    /// Market or limit; both fill at `price`.
    pub order_type: OrderType,
    /// Shares.
    pub quantity: i64,
    /// Fill price.
    pub price: Decimal,
    /// Origin of the instruction.
    pub source: FillSource,
}

impl ExecuteOrder {
    /// Market instruction from the API.
    #[must_use]
    pub const fn market(
        account_id: AccountId,
        symbol: Symbol,
        side: OrderSide,
        quantity: i64,
        price: Decimal,
    ) -> Self {
        Self {
            account_id,
            symbol,
            side,
            order_type: OrderType::Market,
            quantity,
            price,
            source: FillSource::Api,
        }
    }

    /// Parse the textual fields of an API request.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::InvalidOrder`] for an unknown side or order type.
    pub fn from_wire(
        account_id: AccountId,
        symbol: &str,
        side: &str,
        order_type: &str,
        quantity: i64,
        price: Decimal,
    ) -> Result<Self, ExecutionError> {
        Ok(Self {
            account_id,
            symbol: Symbol::new(symbol),
            side: side.parse()?,
            order_type: order_type.parse()?,
            quantity,
            price,
            source: FillSource::Api,
        })
    }
}

/// Use case for applying a single fill.
pub struct ExecuteOrderUseCase<L>
where
    L: LedgerStore,
{
    ledger: Arc<L>,
}

impl<L> ExecuteOrderUseCase<L>
where
    L: LedgerStore,
{
    /// Create a new `ExecuteOrderUseCase`.
    pub const fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Validate the instruction and apply it to the ledger.
    ///
    /// The ledger either applies the fill and journals it or leaves the
    /// account untouched, so retrying a failed call never double-applies.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::InvalidOrder`] for a bad symbol, quantity or price;
    /// ledger rejections (`InsufficientFunds`, `InsufficientShares`,
    /// `NoPosition`, `AccountNotFound`) are passed through unchanged.
    pub async fn execute(&self, order: ExecuteOrder) -> Result<Execution, ExecutionError> {
        let result = self.apply(&order).await;

        match &result {
            Ok(execution) => {
                tracing::info!(
                    execution_id = %execution.id(),
                    account_id = %order.account_id,
                    symbol = %order.symbol,
                    side = %order.side,
                    quantity = order.quantity,
                    price = %order.price,
                    source = order.source.as_str(),
                    "Order filled"
                );
                observability::record_fill(order.side.as_str(), order.source.as_str());
            }
            Err(e) => {
                tracing::info!(
                    account_id = %order.account_id,
                    symbol = %order.symbol,
                    side = %order.side,
                    quantity = order.quantity,
                    error = %e,
                    "Order rejected"
                );
                observability::record_order_rejection(ErrorCode::from(e).reason());
            }
        }

        result
    }

    async fn apply(&self, order: &ExecuteOrder) -> Result<Execution, ExecutionError> {
        let terms = FillTerms::new(order.quantity, order.price)?;
        order.symbol.validate()?;

        let fill = Execution::filled(
            order.account_id.clone(),
            order.symbol.clone(),
            order.side,
            order.order_type,
            terms.quantity(),
            terms.price(),
            Utc::now(),
        );

        match order.side {
            OrderSide::Buy => self.ledger.apply_buy(&fill).await?,
            OrderSide::Sell => self.ledger.apply_sell(&fill).await?,
        }

        Ok(fill)
    }
}
