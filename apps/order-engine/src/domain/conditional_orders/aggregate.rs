//! Conditional order aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ConditionalOrderError, ConditionalStatus, FillStatus, FillTracking, TriggerKind};
use crate::domain::shared::{AccountId, ConditionalOrderId, ExecutionId, OrderSide, Symbol};

/// Fields supplied when submitting a conditional order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConditionalOrder {
    /// Submitting account.
    pub account_id: AccountId,
    /// Instrument.
    pub symbol: Symbol,
    /// Side of the fill produced on trigger.
    pub side: OrderSide,
    /// Trigger kind.
    pub kind: TriggerKind,
    /// Shares to trade on trigger.
    pub quantity: i64,
    /// Price the caller saw when submitting.
    pub reference_price: Option<Decimal>,
    /// Trigger price.
    pub stop_price: Decimal,
    /// Far bound for stop-limit orders.
    pub limit_price: Option<Decimal>,
    /// Trailing distance in percent for trailing-stop orders.
    pub trailing_percent: Option<Decimal>,
}

/// A standing order that becomes a market fill when its trigger fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalOrder {
    id: ConditionalOrderId,
    account_id: AccountId,
    symbol: Symbol,
    side: OrderSide,
    order_kind: TriggerKind,
    quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<Decimal>,
    stop_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trailing_percent: Option<Decimal>,
    status: ConditionalStatus,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    triggered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fill_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fill: Option<FillTracking>,
}

impl ConditionalOrder {
    /// Validate and create an active order.
    ///
    /// # Errors
    ///
    /// [`ConditionalOrderError::InvalidOrder`] when the symbol is malformed,
    /// quantity or any price is not positive, a stop-limit has no limit
    /// price, or the trailing percent is outside (0, 100).
    pub fn create(
        new: NewConditionalOrder,
        now: DateTime<Utc>,
    ) -> Result<Self, ConditionalOrderError> {
        new.symbol.validate()?;
        if new.quantity <= 0 {
            return Err(invalid(format!(
                "quantity must be positive, got {}",
                new.quantity
            )));
        }
        if new.stop_price <= Decimal::ZERO {
            return Err(invalid(format!(
                "stop price must be positive, got {}",
                new.stop_price
            )));
        }
        if let Some(price) = new.reference_price
            && price <= Decimal::ZERO
        {
            return Err(invalid(format!("price must be positive, got {price}")));
        }
        match new.limit_price {
            Some(limit) if limit <= Decimal::ZERO => {
                return Err(invalid(format!("limit price must be positive, got {limit}")));
            }
            None if new.kind == TriggerKind::StopLimit => {
                return Err(invalid("stop-limit orders require a limit price"));
            }
            _ => {}
        }
        if let Some(pct) = new.trailing_percent {
            if new.kind != TriggerKind::TrailingStop {
                return Err(invalid("trailing percent only applies to trailing-stop orders"));
            }
            if pct <= Decimal::ZERO || pct >= Decimal::ONE_HUNDRED {
                return Err(invalid(format!(
                    "trailing percent must be between 0 and 100, got {pct}"
                )));
            }
        }

        Ok(Self {
            id: ConditionalOrderId::generate(),
            account_id: new.account_id,
            symbol: new.symbol,
            side: new.side,
            order_kind: new.kind,
            quantity: new.quantity,
            price: new.reference_price,
            stop_price: new.stop_price,
            limit_price: new.limit_price,
            trailing_percent: new.trailing_percent,
            status: ConditionalStatus::Active,
            created_at: now,
            triggered_at: None,
            fill_price: None,
            fill: None,
        })
    }

    // ---- accessors ----

    /// Order id.
    #[must_use]
    pub const fn id(&self) -> &ConditionalOrderId {
        &self.id
    }

    /// Owning account.
    #[must_use]
    pub const fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Instrument.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Side of the eventual fill.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Trigger kind.
    #[must_use]
    pub const fn kind(&self) -> TriggerKind {
        self.order_kind
    }

    /// Shares to trade.
    #[must_use]
    pub const fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Price supplied at submission.
    #[must_use]
    pub const fn reference_price(&self) -> Option<Decimal> {
        self.price
    }

    /// Current stop price; trailing stops move it.
    #[must_use]
    pub const fn stop_price(&self) -> Decimal {
        self.stop_price
    }

    /// Limit price.
    #[must_use]
    pub const fn limit_price(&self) -> Option<Decimal> {
        self.limit_price
    }

    /// Trailing percent.
    #[must_use]
    pub const fn trailing_percent(&self) -> Option<Decimal> {
        self.trailing_percent
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn status(&self) -> ConditionalStatus {
        self.status
    }

    /// Submission time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Trigger time.
    #[must_use]
    pub const fn triggered_at(&self) -> Option<DateTime<Utc>> {
        self.triggered_at
    }

    /// Price observed when the trigger fired; the fill uses this price.
    #[must_use]
    pub const fn fill_price(&self) -> Option<Decimal> {
        self.fill_price
    }

    /// Fill record, present once triggered.
    #[must_use]
    pub const fn fill(&self) -> Option<&FillTracking> {
        self.fill.as_ref()
    }

    /// Whether `account_id` submitted this order.
    #[must_use]
    pub fn is_owned_by(&self, account_id: &AccountId) -> bool {
        &self.account_id == account_id
    }

    /// Triggered, and no fill attempt currently holds the claim or succeeded.
    #[must_use]
    pub fn is_awaiting_fill(&self) -> bool {
        self.status == ConditionalStatus::Triggered
            && self
                .fill
                .as_ref()
                .is_some_and(|fill| fill.status == FillStatus::Pending)
    }

    // ---- lifecycle transitions ----

    /// `active → triggered`, recording the trigger time and price.
    ///
    /// # Errors
    ///
    /// [`ConditionalOrderError::AlreadyTerminal`] if the order is not active.
    pub fn trigger(&mut self, price: Decimal, at: DateTime<Utc>) -> Result<(), ConditionalOrderError> {
        self.ensure_active()?;
        self.status = ConditionalStatus::Triggered;
        self.triggered_at = Some(at);
        self.fill_price = Some(price);
        self.fill = Some(FillTracking::default());
        Ok(())
    }

    /// `active → cancelled`.
    ///
    /// # Errors
    ///
    /// [`ConditionalOrderError::AlreadyTerminal`] if the order is not active.
    pub fn cancel(&mut self) -> Result<(), ConditionalOrderError> {
        self.ensure_active()?;
        self.status = ConditionalStatus::Cancelled;
        Ok(())
    }

    /// Move a trailing stop. Only active trailing-stop orders move, and only
    /// in the holder's favour: up for sells, down for buys.
    ///
    /// Returns whether the stop changed.
    pub fn ratchet_stop(&mut self, new_stop: Decimal) -> bool {
        if self.status != ConditionalStatus::Active || self.order_kind != TriggerKind::TrailingStop {
            return false;
        }
        let favourable = match self.side {
            OrderSide::Sell => new_stop > self.stop_price,
            OrderSide::Buy => new_stop < self.stop_price,
        };
        if !favourable || new_stop <= Decimal::ZERO {
            return false;
        }
        self.stop_price = new_stop;
        true
    }

    // ---- fill tracking ----

    /// Claim the fill: `pending → in_flight`.
    ///
    /// # Errors
    ///
    /// [`ConditionalOrderError::NotTriggered`], [`ConditionalOrderError::FillInProgress`]
    /// or [`ConditionalOrderError::AlreadyFilled`].
    pub fn begin_fill(&mut self) -> Result<(), ConditionalOrderError> {
        let id = self.id.clone();
        let fill = self.fill_mut()?;
        match fill.status {
            FillStatus::Pending => {
                fill.status = FillStatus::InFlight;
                Ok(())
            }
            FillStatus::InFlight => Err(ConditionalOrderError::FillInProgress { id }),
            FillStatus::Filled => Err(ConditionalOrderError::AlreadyFilled { id }),
        }
    }

    /// `in_flight → filled`, linking the execution.
    ///
    /// # Errors
    ///
    /// Fails unless the caller holds the claim from [`Self::begin_fill`].
    pub fn complete_fill(&mut self, execution_id: ExecutionId) -> Result<(), ConditionalOrderError> {
        let fill = self.claimed_fill()?;
        fill.status = FillStatus::Filled;
        fill.execution_id = Some(execution_id);
        fill.last_error = None;
        Ok(())
    }

    /// `in_flight → pending`, counting the failed attempt.
    ///
    /// # Errors
    ///
    /// Fails unless the caller holds the claim from [`Self::begin_fill`].
    pub fn fail_fill(&mut self, reason: impl Into<String>) -> Result<(), ConditionalOrderError> {
        let fill = self.claimed_fill()?;
        fill.status = FillStatus::Pending;
        fill.attempts += 1;
        fill.last_error = Some(reason.into());
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), ConditionalOrderError> {
        if self.status.is_terminal() {
            return Err(ConditionalOrderError::AlreadyTerminal {
                id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    fn fill_mut(&mut self) -> Result<&mut FillTracking, ConditionalOrderError> {
        match (self.status, self.fill.as_mut()) {
            (ConditionalStatus::Triggered, Some(fill)) => Ok(fill),
            _ => Err(ConditionalOrderError::NotTriggered {
                id: self.id.clone(),
            }),
        }
    }

    fn claimed_fill(&mut self) -> Result<&mut FillTracking, ConditionalOrderError> {
        let id = self.id.clone();
        let fill = self.fill_mut()?;
        match fill.status {
            FillStatus::InFlight => Ok(fill),
            FillStatus::Pending => Err(ConditionalOrderError::FillNotClaimed { id }),
            FillStatus::Filled => Err(ConditionalOrderError::AlreadyFilled { id }),
        }
    }
}

fn invalid(reason: impl Into<String>) -> ConditionalOrderError {
    ConditionalOrderError::InvalidOrder {
        reason: reason.into(),
    }
}
