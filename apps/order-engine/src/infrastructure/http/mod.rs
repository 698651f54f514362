//! HTTP/REST API adapter.
//!
//! Inbound adapter implementing the JSON API on top of the application use
//! cases.

mod controller;
mod extract;
mod request;
mod response;

pub use controller::{AppState, create_router};
pub use extract::{ACCOUNT_HEADER, AccountIdentity};
pub use request::*;
pub use response::*;
