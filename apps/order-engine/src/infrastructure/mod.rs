//! Infrastructure Layer
//!
//! Adapters for the ports and repository traits declared by the inner
//! layers:
//!
//! - **Driven Adapters (Outbound)**
//!   - `persistence/`: in-memory ledger store and conditional order registry
//!   - `price_feed/`: simulated and scripted price feeds
//!
//! - **Driver Adapters (Inbound)**
//!   - `http/`: JSON API controllers
//!
//! - `config/`: dependency injection container

pub mod config;
pub mod http;
pub mod persistence;
pub mod price_feed;
