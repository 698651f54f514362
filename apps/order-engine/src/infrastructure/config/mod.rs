//! Infrastructure Configuration
//!
//! Dependency injection container wiring stores, feeds and use cases.

mod container;

pub use container::{Container, EngineContainer};
