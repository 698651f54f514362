//! HTTP request DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::use_cases::ExecuteOrder;
use crate::domain::conditional_orders::{ConditionalOrderError, NewConditionalOrder};
use crate::domain::order_execution::ExecutionError;
use crate::domain::shared::{AccountId, Symbol};

fn market() -> String {
    "market".to_string()
}

/// Body of `POST /api/orders/place`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    /// Ticker.
    pub symbol: String,
    /// `buy` or `sell`.
    #[serde(alias = "type")]
    pub side: String,
    /// `market` or `limit`.
    #[serde(default = "market")]
    pub order_type: String,
    /// Shares.
    pub quantity: i64,
    /// Fill price.
    pub price: Decimal,
}

impl PlaceOrderRequest {
    /// Build the execution instruction for `account_id`.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::InvalidOrder`] for an unknown side or order type.
    pub fn into_order(self, account_id: AccountId) -> Result<ExecuteOrder, ExecutionError> {
        ExecuteOrder::from_wire(
            account_id,
            &self.symbol,
            &self.side,
            &self.order_type,
            self.quantity,
            self.price,
        )
    }
}

/// Body of `POST /api/advanced-orders/stop`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopOrderRequest {
    /// Ticker.
    pub symbol: String,
    /// `buy` or `sell`.
    #[serde(alias = "type")]
    pub side: String,
    /// `stop`, `stop-limit` or `trailing-stop`.
    #[serde(alias = "orderType")]
    pub order_kind: String,
    /// Shares.
    pub quantity: i64,
    /// Price the caller saw when submitting.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Trigger price.
    pub stop_price: Decimal,
    /// Far bound for stop-limit orders.
    #[serde(default)]
    pub limit_price: Option<Decimal>,
    /// Trailing distance in percent.
    #[serde(default)]
    pub trailing_percent: Option<Decimal>,
}

impl StopOrderRequest {
    /// Build the registration request for `account_id`.
    ///
    /// # Errors
    ///
    /// [`ConditionalOrderError::InvalidOrder`] for an unknown side or kind.
    pub fn into_new_order(
        self,
        account_id: AccountId,
    ) -> Result<NewConditionalOrder, ConditionalOrderError> {
        Ok(NewConditionalOrder {
            account_id,
            symbol: Symbol::new(&self.symbol),
            side: self.side.parse()?,
            kind: self.order_kind.parse()?,
            quantity: self.quantity,
            reference_price: self.price,
            stop_price: self.stop_price,
            limit_price: self.limit_price,
            trailing_percent: self.trailing_percent,
        })
    }
}

/// Body of `POST /api/accounts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccountRequest {
    /// Opening cash; the configured default when absent.
    #[serde(default)]
    pub starting_cash: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conditional_orders::TriggerKind;
    use crate::domain::order_execution::OrderType;
    use crate::domain::shared::OrderSide;
    use rust_decimal_macros::dec;

    #[test]
    fn place_order_accepts_legacy_type_field() {
        let request: PlaceOrderRequest = serde_json::from_value(serde_json::json!({
            "symbol": "aapl",
            "type": "buy",
            "quantity": 10,
            "price": "175.50"
        }))
        .unwrap();

        let order = request.into_order(AccountId::new("acct-1")).unwrap();
        assert_eq!(order.symbol.as_str(), "AAPL");
        assert_eq!(order.side, OrderSide::Buy);
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.price, dec!(175.50));
    }

    #[test]
    fn place_order_rejects_unknown_side() {
        let request = PlaceOrderRequest {
            symbol: "AAPL".to_string(),
            side: "short".to_string(),
            order_type: "market".to_string(),
            quantity: 1,
            price: dec!(1),
        };
        assert!(matches!(
            request.into_order(AccountId::new("acct-1")),
            Err(ExecutionError::InvalidOrder { .. })
        ));
    }

    #[test]
    fn stop_order_maps_kind_and_optionals() {
        let request: StopOrderRequest = serde_json::from_value(serde_json::json!({
            "symbol": "AAPL",
            "side": "sell",
            "orderKind": "trailing-stop",
            "quantity": 5,
            "price": 200,
            "stopPrice": 190,
            "trailingPercent": 5
        }))
        .unwrap();

        let new = request.into_new_order(AccountId::new("acct-1")).unwrap();
        assert_eq!(new.kind, TriggerKind::TrailingStop);
        assert_eq!(new.trailing_percent, Some(dec!(5)));
        assert_eq!(new.limit_price, None);
    }
}
