//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod cancel_conditional_order;
mod create_conditional_order;
mod execute_order;
mod get_portfolio;
mod monitor_triggers;

pub use cancel_conditional_order::CancelConditionalOrderUseCase;
pub use create_conditional_order::CreateConditionalOrderUseCase;
pub use execute_order::{ExecuteOrder, ExecuteOrderUseCase, FillSource};
pub use get_portfolio::{GetPortfolioUseCase, PortfolioView, PositionValuation};
pub use monitor_triggers::{MonitorSettings, MonitorTriggersUseCase, TickReport};
