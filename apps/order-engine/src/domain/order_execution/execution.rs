//! Execution record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ExecutionError, ExecutionStatus, OrderType};
use crate::domain::shared::{AccountId, ExecutionId, OrderSide, Symbol};

/// Quantity and price of an instruction that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillTerms {
    quantity: i64,
    price: Decimal,
    notional: Decimal,
}

impl FillTerms {
    /// Validate raw quantity and price.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::InvalidOrder`] when either is zero or negative, or
    /// when `quantity * price` does not fit in a decimal.
    pub fn new(quantity: i64, price: Decimal) -> Result<Self, ExecutionError> {
        if quantity <= 0 {
            return Err(ExecutionError::InvalidOrder {
                reason: format!("quantity must be positive, got {quantity}"),
            });
        }
        if price <= Decimal::ZERO {
            return Err(ExecutionError::InvalidOrder {
                reason: format!("price must be positive, got {price}"),
            });
        }
        let notional = price.checked_mul(Decimal::from(quantity)).ok_or_else(|| {
            ExecutionError::InvalidOrder {
                reason: format!("order value of {quantity} x {price} is out of range"),
            }
        })?;
        Ok(Self {
            quantity,
            price,
            notional,
        })
    }

    /// Shares.
    #[must_use]
    pub const fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Price per share.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// `quantity * price`.
    #[must_use]
    pub const fn notional(&self) -> Decimal {
        self.notional
    }
}

/// Immutable record of a completed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    id: ExecutionId,
    account_id: AccountId,
    symbol: Symbol,
    side: OrderSide,
    order_type: OrderType,
    quantity: i64,
    price: Decimal,
    status: ExecutionStatus,
    timestamp: DateTime<Utc>,
}

impl Execution {
    /// Build a filled record with a fresh id.
    #[must_use]
    pub fn filled(
        account_id: AccountId,
        symbol: Symbol,
        side: OrderSide,
        order_type: OrderType,
        quantity: i64,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ExecutionId::generate(),
            account_id,
            symbol,
            side,
            order_type,
            quantity,
            price,
            status: ExecutionStatus::Filled,
            timestamp,
        }
    }

    /// Record id.
    #[must_use]
    pub const fn id(&self) -> &ExecutionId {
        &self.id
    }

    /// Account the fill belongs to.
    #[must_use]
    pub const fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Instrument traded.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Buy or sell.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Requested order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Shares traded.
    #[must_use]
    pub const fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Fill price.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Always [`ExecutionStatus::Filled`].
    #[must_use]
    pub const fn status(&self) -> ExecutionStatus {
        self.status
    }

    /// Fill time.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
