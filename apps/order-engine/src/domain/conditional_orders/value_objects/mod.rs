//! Conditional order value objects.

mod fill_tracking;
mod status;
mod trigger_kind;

pub use fill_tracking::{FillStatus, FillTracking};
pub use status::ConditionalStatus;
pub use trigger_kind::TriggerKind;
