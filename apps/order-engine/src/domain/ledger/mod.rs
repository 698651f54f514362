//! Ledger Bounded Context
//!
//! Cash balances, positions and the per-account fill journal. The ledger is
//! the only place balances and share counts change.
//!
//! # Invariants
//!
//! - Cash never goes negative.
//! - A position always holds at least one share; a position that reaches
//!   zero shares is removed.
//! - `avg_cost * shares` is the cost basis of the shares still held.

mod account;
mod errors;
mod position;
mod repository;

pub use account::{AccountBook, AccountSnapshot, UnknownAccountPolicy};
pub use errors::LedgerError;
pub use position::Position;
pub use repository::LedgerStore;
