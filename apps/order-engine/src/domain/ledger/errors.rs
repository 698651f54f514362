//! Ledger errors.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::shared::{AccountId, Symbol};

/// Errors raised while reading or mutating the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The account cannot cover the cost of a buy.
    #[error("insufficient funds: have ${available}, need ${required}")]
    InsufficientFunds {
        /// Cash available.
        available: Decimal,
        /// Cost of the buy.
        required: Decimal,
    },

    /// The account holds fewer shares than it is trying to sell.
    #[error("insufficient shares of {symbol}: have {held}, want {requested}")]
    InsufficientShares {
        /// Symbol being sold.
        symbol: Symbol,
        /// Shares held.
        held: i64,
        /// Shares requested.
        requested: i64,
    },

    /// The account has no position in the symbol.
    #[error("you own no {symbol}")]
    NoPosition {
        /// Symbol being sold.
        symbol: Symbol,
    },

    /// The fill would push cash, cost basis or share count past what the
    /// ledger can represent.
    #[error("fill of {quantity} {symbol} at {price} exceeds the ledger's numeric range")]
    OutOfRange {
        /// Symbol being traded.
        symbol: Symbol,
        /// Shares in the fill.
        quantity: i64,
        /// Fill price.
        price: Decimal,
    },

    /// The account is unknown and the store does not open accounts on demand.
    #[error("account {account_id} not found")]
    AccountNotFound {
        /// Account identifier.
        account_id: AccountId,
    },

    /// An explicit open hit an existing account.
    #[error("account {account_id} already exists")]
    AccountExists {
        /// Account identifier.
        account_id: AccountId,
    },

    /// The backing store failed.
    #[error("ledger storage failure: {message}")]
    Storage {
        /// Error details.
        message: String,
    },
}
