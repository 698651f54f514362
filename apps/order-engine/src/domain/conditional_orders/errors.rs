//! Conditional order errors.

use thiserror::Error;

use super::ConditionalStatus;
use crate::domain::ledger::LedgerError;
use crate::domain::shared::{ConditionalOrderId, DomainError, Symbol};

/// Errors raised by the conditional order registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionalOrderError {
    /// Malformed order: bad quantity, prices, kind or trailing percent.
    #[error("invalid order: {reason}")]
    InvalidOrder {
        /// What was wrong.
        reason: String,
    },

    /// A sell-side order asks for more shares than the account holds.
    #[error("insufficient shares for stop loss order on {symbol}: have {held}, want {requested}")]
    InsufficientShares {
        /// Symbol.
        symbol: Symbol,
        /// Shares held when the order was submitted.
        held: i64,
        /// Shares requested.
        requested: i64,
    },

    /// No order with this id (or not visible to the caller).
    #[error("conditional order {id} not found")]
    NotFound {
        /// Order id.
        id: ConditionalOrderId,
    },

    /// The order already left `active`.
    #[error("conditional order {id} is already {status}")]
    AlreadyTerminal {
        /// Order id.
        id: ConditionalOrderId,
        /// State it reached.
        status: ConditionalStatus,
    },

    /// Fill tracking was used on an order that has not triggered.
    #[error("conditional order {id} has not triggered")]
    NotTriggered {
        /// Order id.
        id: ConditionalOrderId,
    },

    /// Another actor holds the fill claim.
    #[error("fill for conditional order {id} is already in flight")]
    FillInProgress {
        /// Order id.
        id: ConditionalOrderId,
    },

    /// A fill was completed or failed without first being claimed.
    #[error("fill for conditional order {id} was not claimed")]
    FillNotClaimed {
        /// Order id.
        id: ConditionalOrderId,
    },

    /// The triggered order already produced its execution.
    #[error("conditional order {id} is already filled")]
    AlreadyFilled {
        /// Order id.
        id: ConditionalOrderId,
    },

    /// Ledger lookup failed during validation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The backing store failed.
    #[error("conditional order storage failure: {message}")]
    Storage {
        /// Error details.
        message: String,
    },
}

impl From<DomainError> for ConditionalOrderError {
    fn from(err: DomainError) -> Self {
        Self::InvalidOrder {
            reason: err.to_string(),
        }
    }
}
