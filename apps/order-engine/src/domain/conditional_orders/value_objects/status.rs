//! Lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a conditional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionalStatus {
    /// Waiting for its trigger.
    #[default]
    Active,
    /// Fired. Terminal.
    Triggered,
    /// Cancelled by the account. Terminal.
    Cancelled,
}

impl ConditionalStatus {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl fmt::Display for ConditionalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Triggered => "triggered",
            Self::Cancelled => "cancelled",
        })
    }
}
