//! Execution errors.

use thiserror::Error;

use crate::domain::ledger::LedgerError;
use crate::domain::shared::DomainError;

/// Reasons an instruction did not produce a fill.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Malformed instruction: non-positive quantity or price, unknown side,
    /// bad symbol.
    #[error("invalid order: {reason}")]
    InvalidOrder {
        /// What was wrong.
        reason: String,
    },

    /// Ledger rejection, passed through unchanged.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<DomainError> for ExecutionError {
    fn from(err: DomainError) -> Self {
        Self::InvalidOrder {
            reason: err.to_string(),
        }
    }
}
