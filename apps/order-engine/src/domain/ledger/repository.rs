//! Ledger store trait.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{AccountSnapshot, LedgerError, Position};
use crate::domain::order_execution::Execution;
use crate::domain::shared::{AccountId, Symbol};

/// Durable mapping from account to cash, positions and fills.
///
/// Implementations must serialize mutations per account: a buy or sell
/// changes cash, the position and the journal together or not at all.
/// Different accounts are independent.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Explicitly open an account.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountExists`] if the account is already open.
    async fn open_account(
        &self,
        account_id: &AccountId,
        starting_cash: Decimal,
    ) -> Result<AccountSnapshot, LedgerError>;

    /// Cash balance.
    async fn get_balance(&self, account_id: &AccountId) -> Result<Decimal, LedgerError>;

    /// Position in `symbol`; a flat position (0 shares, 0 cost) when none is held.
    async fn get_position(
        &self,
        account_id: &AccountId,
        symbol: &Symbol,
    ) -> Result<Position, LedgerError>;

    /// All held positions.
    async fn list_positions(&self, account_id: &AccountId) -> Result<Vec<Position>, LedgerError>;

    /// Cash and positions read under one lock.
    async fn snapshot(&self, account_id: &AccountId) -> Result<AccountSnapshot, LedgerError>;

    /// Apply a buy fill: debit cash, grow the position, journal the fill.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientFunds`] leaves the account untouched.
    async fn apply_buy(&self, fill: &Execution) -> Result<(), LedgerError>;

    /// Apply a sell fill: credit cash, shrink or remove the position, journal the fill.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NoPosition`] or [`LedgerError::InsufficientShares`]
    /// leave the account untouched.
    async fn apply_sell(&self, fill: &Execution) -> Result<(), LedgerError>;

    /// Journaled fills, newest first.
    async fn executions(&self, account_id: &AccountId) -> Result<Vec<Execution>, LedgerError>;
}
