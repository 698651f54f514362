//! Domain Layer
//!
//! Pure business logic for the paper trading engine, organised by bounded
//! context:
//!
//! - [`ledger`]: account cash, positions and the fill journal
//! - [`order_execution`]: immutable execution records and order validation
//! - [`conditional_orders`]: stop / stop-limit / trailing-stop lifecycle
//! - [`shared`]: identifiers and value objects used across contexts
//!
//! Nothing in this layer performs I/O. Persistence is expressed through the
//! repository traits each context declares.

pub mod conditional_orders;
pub mod ledger;
pub mod order_execution;
pub mod shared;
