//! Fill tracking for triggered orders.

use serde::{Deserialize, Serialize};

use crate::domain::shared::ExecutionId;

/// Progress of the market fill that follows a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStatus {
    /// Waiting for a fill attempt.
    #[default]
    Pending,
    /// An attempt holds the claim.
    InFlight,
    /// The execution exists.
    Filled,
}

/// Fill record attached to a triggered order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillTracking {
    /// Current progress.
    pub status: FillStatus,
    /// Failed attempts so far.
    pub attempts: u32,
    /// Most recent failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Execution produced by the fill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<ExecutionId>,
}
