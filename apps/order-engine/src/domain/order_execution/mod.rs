//! Order Execution Bounded Context
//!
//! An [`Execution`] is the immutable record of a completed trade. It is built
//! from validated [`FillTerms`] and only exists once the ledger has accepted it.

mod errors;
mod execution;
mod value_objects;

pub use errors::ExecutionError;
pub use execution::{Execution, FillTerms};
pub use value_objects::{ExecutionStatus, OrderType};
