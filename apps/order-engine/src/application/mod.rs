//! Application Layer
//!
//! Orchestrates the domain through use cases:
//!
//! - **Ports**: interfaces to collaborators outside the engine (price feed)
//! - **Use Cases**: order execution, conditional order management, trigger
//!   scanning and portfolio queries
//! - **Services**: long-running background tasks

pub mod ports;
pub mod services;
pub mod use_cases;

pub use ports::*;
pub use services::*;
pub use use_cases::*;
