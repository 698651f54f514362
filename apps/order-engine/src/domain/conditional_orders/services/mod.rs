//! Conditional order domain services.

mod trigger_evaluator;

pub use trigger_evaluator::{TriggerDecision, TriggerEvaluator};
