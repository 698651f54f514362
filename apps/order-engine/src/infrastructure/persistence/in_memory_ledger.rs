//! In-memory ledger store.
//!
//! Each account sits behind its own mutex; the outer map lock is only held
//! long enough to find or insert an account. Mutations on one account are
//! therefore serialized while different accounts proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;

use crate::domain::ledger::{
    AccountBook, AccountSnapshot, LedgerError, LedgerStore, Position, UnknownAccountPolicy,
};
use crate::domain::order_execution::Execution;
use crate::domain::shared::{AccountId, OrderSide, Symbol};

type SharedBook = Arc<Mutex<AccountBook>>;

/// In-memory implementation of [`LedgerStore`].
#[derive(Debug)]
pub struct InMemoryLedgerStore {
    policy: UnknownAccountPolicy,
    accounts: RwLock<HashMap<AccountId, SharedBook>>,
}

impl InMemoryLedgerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(policy: UnknownAccountPolicy) -> Self {
        Self {
            policy,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Policy applied to unknown accounts.
    #[must_use]
    pub const fn policy(&self) -> UnknownAccountPolicy {
        self.policy
    }

    /// Number of open accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    fn account(&self, account_id: &AccountId) -> Result<SharedBook, LedgerError> {
        let existing = self.accounts.read().get(account_id).cloned();
        if let Some(book) = existing {
            return Ok(book);
        }

        match self.policy {
            UnknownAccountPolicy::Reject => Err(LedgerError::AccountNotFound {
                account_id: account_id.clone(),
            }),
            UnknownAccountPolicy::AutoOpen { starting_cash } => {
                let mut accounts = self.accounts.write();
                let book = accounts.entry(account_id.clone()).or_insert_with(|| {
                    tracing::info!(
                        account_id = %account_id,
                        starting_cash = %starting_cash,
                        "Opened account on first use"
                    );
                    Arc::new(Mutex::new(AccountBook::open(account_id.clone(), starting_cash)))
                });
                Ok(Arc::clone(book))
            }
        }
    }

    fn settle(&self, fill: &Execution) -> Result<(), LedgerError> {
        let book = self.account(fill.account_id())?;
        let mut book = book.lock();
        book.settle(fill)
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn open_account(
        &self,
        account_id: &AccountId,
        starting_cash: Decimal,
    ) -> Result<AccountSnapshot, LedgerError> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(account_id) {
            return Err(LedgerError::AccountExists {
                account_id: account_id.clone(),
            });
        }

        let book = AccountBook::open(account_id.clone(), starting_cash);
        let snapshot = book.snapshot();
        accounts.insert(account_id.clone(), Arc::new(Mutex::new(book)));
        tracing::info!(account_id = %account_id, starting_cash = %starting_cash, "Account opened");
        Ok(snapshot)
    }

    async fn get_balance(&self, account_id: &AccountId) -> Result<Decimal, LedgerError> {
        Ok(self.account(account_id)?.lock().cash())
    }

    async fn get_position(
        &self,
        account_id: &AccountId,
        symbol: &Symbol,
    ) -> Result<Position, LedgerError> {
        let book = self.account(account_id)?;
        let book = book.lock();
        Ok(book
            .position(symbol)
            .cloned()
            .unwrap_or_else(|| Position::flat(symbol.clone())))
    }

    async fn list_positions(&self, account_id: &AccountId) -> Result<Vec<Position>, LedgerError> {
        Ok(self.account(account_id)?.lock().snapshot().positions)
    }

    async fn snapshot(&self, account_id: &AccountId) -> Result<AccountSnapshot, LedgerError> {
        Ok(self.account(account_id)?.lock().snapshot())
    }

    async fn apply_buy(&self, fill: &Execution) -> Result<(), LedgerError> {
        debug_assert_eq!(fill.side(), OrderSide::Buy);
        self.settle(fill)
    }

    async fn apply_sell(&self, fill: &Execution) -> Result<(), LedgerError> {
        debug_assert_eq!(fill.side(), OrderSide::Sell);
        self.settle(fill)
    }

    async fn executions(&self, account_id: &AccountId) -> Result<Vec<Execution>, LedgerError> {
        let book = self.account(account_id)?;
        let book = book.lock();
        Ok(book.journal().iter().rev().cloned().collect())
    }
}
