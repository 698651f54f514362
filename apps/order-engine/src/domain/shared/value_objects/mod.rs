//! Shared value objects.

mod identifiers;
mod side;
mod symbol;

pub use identifiers::{AccountId, ConditionalOrderId, ExecutionId};
pub use side::OrderSide;
pub use symbol::Symbol;
