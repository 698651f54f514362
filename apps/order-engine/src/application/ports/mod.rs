//! Ports (Driven)
//!
//! Collaborators the engine consumes but does not own.

mod price_feed_port;

pub use price_feed_port::{PriceFeedError, PriceFeedPort};
