// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Order Engine - Paper Trading Core
//!
//! Simulated brokerage engine: per-account cash and positions, immediate
//! market/limit fills, and conditional orders promoted to fills by a
//! background trigger monitor.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic
//!   - `ledger`: account book, positions, average-cost arithmetic
//!   - `order_execution`: fill terms and the `Execution` record
//!   - `conditional_orders`: stop / stop-limit / trailing-stop lifecycle and
//!     trigger evaluation
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: `PriceFeedPort`
//!   - `use_cases`: `ExecuteOrder`, `CreateConditionalOrder`,
//!     `CancelConditionalOrder`, `MonitorTriggers`, `GetPortfolio`
//!   - `services`: the trigger monitor background task
//!
//! - **Infrastructure**: Adapters
//!   - `persistence`: in-memory ledger store and conditional order registry
//!   - `price_feed`: simulated and scripted feeds
//!   - `http`: axum JSON API
//!   - `config`: dependency injection container

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Configuration loading.
pub mod config;

/// API error codes and HTTP mapping.
pub mod error;

/// Prometheus metrics.
pub mod observability;

/// Tracing subscriber setup.
pub mod telemetry;

pub use application::use_cases::{ExecuteOrder, ExecuteOrderUseCase, MonitorTriggersUseCase};
pub use domain::conditional_orders::{ConditionalOrder, ConditionalStatus, TriggerKind};
pub use domain::ledger::{LedgerError, LedgerStore, Position, UnknownAccountPolicy};
pub use domain::order_execution::{Execution, ExecutionError, OrderType};
pub use domain::shared::{AccountId, OrderSide, Symbol};
pub use error::{ApiError, ErrorCode};
