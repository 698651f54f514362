//! HTTP response DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::conditional_orders::ConditionalOrder;
use crate::domain::order_execution::Execution;
use crate::domain::shared::{AccountId, Symbol};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests.
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Response to a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    /// Confirmation text.
    pub message: String,
    /// Resulting fill.
    pub order: Execution,
}

/// Response to a registered conditional order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopOrderResponse {
    /// Confirmation text.
    pub message: String,
    /// Registered order.
    pub order: ConditionalOrder,
}

/// Bare confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Confirmation text.
    pub message: String,
}

/// List of orders or fills.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersResponse<T> {
    /// Items, in the order documented by the endpoint.
    pub orders: Vec<T>,
}

/// Newly opened account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Account identifier.
    pub account_id: AccountId,
    /// Opening cash.
    pub cash_balance: Decimal,
}

/// Last price for a symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    /// Ticker.
    pub symbol: Symbol,
    /// Price.
    pub price: Decimal,
}
