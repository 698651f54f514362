//! Ledger configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ledger::UnknownAccountPolicy;

/// What to do with an account id the ledger has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownAccountMode {
    /// Fail with `AccountNotFound`.
    Reject,
    /// Open it with `starting_cash` on first use.
    #[default]
    AutoOpen,
}

/// Ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Cash credited to new accounts.
    #[serde(default = "default_starting_cash")]
    pub starting_cash: Decimal,
    /// Unknown account handling.
    #[serde(default)]
    pub unknown_account_policy: UnknownAccountMode,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            starting_cash: default_starting_cash(),
            unknown_account_policy: UnknownAccountMode::default(),
        }
    }
}

impl LedgerConfig {
    /// Policy handed to the ledger store.
    #[must_use]
    pub const fn policy(&self) -> UnknownAccountPolicy {
        match self.unknown_account_policy {
            UnknownAccountMode::Reject => UnknownAccountPolicy::Reject,
            UnknownAccountMode::AutoOpen => UnknownAccountPolicy::AutoOpen {
                starting_cash: self.starting_cash,
            },
        }
    }
}

fn default_starting_cash() -> Decimal {
    Decimal::new(10_000, 0)
}
