//! Price Feed Adapters
//!
//! Implementations of [`PriceFeedPort`](crate::application::ports::PriceFeedPort).

mod mock;
mod simulated;

pub use mock::MockPriceFeed;
pub use simulated::SimulatedPriceFeed;
