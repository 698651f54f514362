//! Persistence Adapters
//!
//! In-memory implementations of the ledger store and conditional order
//! registry. State lives for the life of the process.

mod in_memory_conditional_orders;
mod in_memory_ledger;

pub use in_memory_conditional_orders::InMemoryConditionalOrderRepository;
pub use in_memory_ledger::InMemoryLedgerStore;
