//! Account book: one account's cash, positions and fill journal.
//!
//! Every mutation checks all of its preconditions before touching state, so a
//! rejected buy or sell leaves the book exactly as it was.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LedgerError, Position};
use crate::domain::order_execution::Execution;
use crate::domain::shared::{AccountId, OrderSide, Symbol};

/// What a ledger store does when it is asked about an account it has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownAccountPolicy {
    /// Fail with [`LedgerError::AccountNotFound`]; accounts must be opened explicitly.
    Reject,
    /// Open the account on first touch with the given cash. The opened
    /// account is persisted, so subsequent debits and credits stick.
    AutoOpen {
        /// Cash credited to a newly opened account.
        starting_cash: Decimal,
    },
}

/// Point-in-time copy of an account, taken under the account lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    /// Account identifier.
    pub account_id: AccountId,
    /// Cash balance.
    pub cash: Decimal,
    /// Held positions ordered by symbol.
    pub positions: Vec<Position>,
}

/// Mutable state of a single account.
#[derive(Debug, Clone)]
pub struct AccountBook {
    account_id: AccountId,
    cash: Decimal,
    positions: BTreeMap<Symbol, Position>,
    journal: Vec<Execution>,
}

impl AccountBook {
    /// Open an account with `starting_cash` and no positions.
    #[must_use]
    pub const fn open(account_id: AccountId, starting_cash: Decimal) -> Self {
        Self {
            account_id,
            cash: starting_cash,
            positions: BTreeMap::new(),
            journal: Vec::new(),
        }
    }

    /// Account identifier.
    #[must_use]
    pub const fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Cash balance.
    #[must_use]
    pub const fn cash(&self) -> Decimal {
        self.cash
    }

    /// Position in `symbol`, if any shares are held.
    #[must_use]
    pub fn position(&self, symbol: &Symbol) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// Applied fills, oldest first.
    #[must_use]
    pub fn journal(&self) -> &[Execution] {
        &self.journal
    }

    /// Copy of cash and positions.
    #[must_use]
    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            account_id: self.account_id.clone(),
            cash: self.cash,
            positions: self.positions.values().cloned().collect(),
        }
    }

    /// Debit `qty * price` and add the shares to the position.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientFunds`] when the cash balance is below the
    /// cost and [`LedgerError::OutOfRange`] when the cost or the resulting
    /// position cannot be represented.
    pub fn apply_buy(&mut self, symbol: &Symbol, qty: i64, price: Decimal) -> Result<(), LedgerError> {
        debug_assert!(qty > 0 && price > Decimal::ZERO);
        let cost = notional(symbol, qty, price)?;
        if self.cash < cost {
            return Err(LedgerError::InsufficientFunds {
                available: self.cash,
                required: cost,
            });
        }

        let position = match self.positions.get(symbol) {
            Some(held) => held
                .with_added(qty, price)
                .ok_or_else(|| out_of_range(symbol, qty, price))?,
            None => Position::opened(symbol.clone(), qty, price),
        };

        self.cash -= cost;
        self.positions.insert(symbol.clone(), position);
        Ok(())
    }

    /// Credit `qty * price` and remove the shares, dropping the position at zero.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NoPosition`] when nothing is held,
    /// [`LedgerError::InsufficientShares`] when fewer than `qty` shares are held
    /// and [`LedgerError::OutOfRange`] when the proceeds cannot be credited.
    pub fn apply_sell(&mut self, symbol: &Symbol, qty: i64, price: Decimal) -> Result<(), LedgerError> {
        debug_assert!(qty > 0 && price > Decimal::ZERO);
        let Some(position) = self.positions.get_mut(symbol) else {
            return Err(LedgerError::NoPosition {
                symbol: symbol.clone(),
            });
        };
        if position.shares < qty {
            return Err(LedgerError::InsufficientShares {
                symbol: symbol.clone(),
                held: position.shares,
                requested: qty,
            });
        }
        let cash = notional(symbol, qty, price)?
            .checked_add(self.cash)
            .ok_or_else(|| out_of_range(symbol, qty, price))?;

        position.shares -= qty;
        if position.is_flat() {
            self.positions.remove(symbol);
        }
        self.cash = cash;
        Ok(())
    }

    /// Apply a fill and append it to the journal as one step.
    ///
    /// # Errors
    ///
    /// Whatever [`Self::apply_buy`] or [`Self::apply_sell`] returns; the journal
    /// is untouched on error.
    pub fn settle(&mut self, execution: &Execution) -> Result<(), LedgerError> {
        match execution.side() {
            OrderSide::Buy => {
                self.apply_buy(execution.symbol(), execution.quantity(), execution.price())?;
            }
            OrderSide::Sell => {
                self.apply_sell(execution.symbol(), execution.quantity(), execution.price())?;
            }
        }
        self.journal.push(execution.clone());
        Ok(())
    }
}

fn notional(symbol: &Symbol, qty: i64, price: Decimal) -> Result<Decimal, LedgerError> {
    price
        .checked_mul(Decimal::from(qty))
        .ok_or_else(|| out_of_range(symbol, qty, price))
}

fn out_of_range(symbol: &Symbol, quantity: i64, price: Decimal) -> LedgerError {
    LedgerError::OutOfRange {
        symbol: symbol.clone(),
        quantity,
        price,
    }
}
