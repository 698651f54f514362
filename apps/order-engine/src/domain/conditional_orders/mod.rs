//! Conditional Orders Bounded Context
//!
//! Stop, stop-limit and trailing-stop orders waiting for a trigger price.
//!
//! # Lifecycle
//!
//! ```text
//! Active ──trigger──► Triggered   (terminal)
//!    │
//!    └────cancel────► Cancelled   (terminal)
//! ```
//!
//! A triggered order carries a separate fill record tracking the market fill
//! that follows the trigger (`Pending → InFlight → Filled`, with failed
//! attempts returning to `Pending`). Fill tracking never changes the
//! lifecycle state.

mod aggregate;
mod errors;
mod repository;
pub mod services;
pub mod value_objects;

pub use aggregate::{ConditionalOrder, NewConditionalOrder};
pub use errors::ConditionalOrderError;
pub use repository::{ConditionalOrderRepository, Ratcheted};
pub use services::{TriggerDecision, TriggerEvaluator};
pub use value_objects::{ConditionalStatus, FillStatus, FillTracking, TriggerKind};
