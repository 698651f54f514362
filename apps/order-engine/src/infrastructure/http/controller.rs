//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to application use cases.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;

use crate::application::ports::{PriceFeedError, PriceFeedPort};
use crate::application::use_cases::{
    CancelConditionalOrderUseCase, CreateConditionalOrderUseCase, ExecuteOrderUseCase,
    GetPortfolioUseCase, PortfolioView,
};
use crate::domain::conditional_orders::{ConditionalOrder, ConditionalOrderRepository};
use crate::domain::ledger::LedgerStore;
use crate::domain::order_execution::Execution;
use crate::domain::shared::{ConditionalOrderId, Symbol};
use crate::error::ApiError;

use super::extract::AccountIdentity;
use super::request::{OpenAccountRequest, PlaceOrderRequest, StopOrderRequest};
use super::response::{
    AccountResponse, HealthResponse, MessageResponse, OrdersResponse, PlaceOrderResponse,
    QuoteResponse, StopOrderResponse,
};

/// Application state shared across handlers.
pub struct AppState<L, R, P>
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
    P: PriceFeedPort,
{
    /// Use case for market and limit fills.
    pub execute_order: Arc<ExecuteOrderUseCase<L>>,
    /// Use case for registering conditional orders.
    pub create_conditional_order: Arc<CreateConditionalOrderUseCase<L, R>>,
    /// Use case for cancelling conditional orders.
    pub cancel_conditional_order: Arc<CancelConditionalOrderUseCase<R>>,
    /// Use case for the portfolio view.
    pub get_portfolio: Arc<GetPortfolioUseCase<L, P>>,
    /// Ledger for account opening and journal queries.
    pub ledger: Arc<L>,
    /// Registry for active order queries.
    pub registry: Arc<R>,
    /// Price feed for quote lookups.
    pub price_feed: Arc<P>,
    /// Bound on a single quote lookup.
    pub price_timeout: Duration,
    /// Opening cash when `POST /api/accounts` omits it.
    pub starting_cash: Decimal,
    /// Prometheus renderer, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
    /// Application version.
    pub version: String,
}

impl<L, R, P> Clone for AppState<L, R, P>
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
    P: PriceFeedPort,
{
    fn clone(&self) -> Self {
        Self {
            execute_order: Arc::clone(&self.execute_order),
            create_conditional_order: Arc::clone(&self.create_conditional_order),
            cancel_conditional_order: Arc::clone(&self.cancel_conditional_order),
            get_portfolio: Arc::clone(&self.get_portfolio),
            ledger: Arc::clone(&self.ledger),
            registry: Arc::clone(&self.registry),
            price_feed: Arc::clone(&self.price_feed),
            price_timeout: self.price_timeout,
            starting_cash: self.starting_cash,
            metrics: self.metrics.clone(),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<L, R, P>(state: AppState<L, R, P>) -> Router
where
    L: LedgerStore + 'static,
    R: ConditionalOrderRepository + 'static,
    P: PriceFeedPort + 'static,
{
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/accounts", post(open_account))
        .route("/api/orders/place", post(place_order))
        .route("/api/orders", get(list_executions))
        .route("/api/portfolio", get(get_portfolio))
        .route("/api/advanced-orders/stop", post(create_stop_order))
        .route("/api/advanced-orders/active", get(list_active_orders))
        .route("/api/advanced-orders/cancel/{id}", post(cancel_stop_order))
        .route("/api/stocks/{symbol}", get(get_stock_price));

    let router = match state.metrics.clone() {
        Some(handle) => router.route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        ),
        None => router,
    };

    router.with_state(state)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid_request(rejection.body_text()))
}

/// Health check endpoint.
async fn health_check<L, R, P>(State(state): State<AppState<L, R, P>>) -> impl IntoResponse
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
    P: PriceFeedPort,
{
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
    })
}

/// Open an account explicitly.
async fn open_account<L, R, P>(
    State(state): State<AppState<L, R, P>>,
    AccountIdentity(account_id): AccountIdentity,
    payload: Result<Json<OpenAccountRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
    P: PriceFeedPort,
{
    let request = body(payload)?;
    let starting_cash = request.starting_cash.unwrap_or(state.starting_cash);
    if starting_cash <= Decimal::ZERO {
        return Err(ApiError::invalid_request(format!(
            "starting cash must be positive, got {starting_cash}"
        )));
    }

    let snapshot = state.ledger.open_account(&account_id, starting_cash).await?;
    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            account_id: snapshot.account_id,
            cash_balance: snapshot.cash,
        }),
    ))
}

/// Place a market or limit order; fills immediately at the given price.
async fn place_order<L, R, P>(
    State(state): State<AppState<L, R, P>>,
    AccountIdentity(account_id): AccountIdentity,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<Json<PlaceOrderResponse>, ApiError>
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
    P: PriceFeedPort,
{
    let order = body(payload)?.into_order(account_id)?;
    let execution = state.execute_order.execute(order).await?;
    Ok(Json(PlaceOrderResponse {
        message: "Order placed successfully".to_string(),
        order: execution,
    }))
}

/// Execution history, newest first.
async fn list_executions<L, R, P>(
    State(state): State<AppState<L, R, P>>,
    AccountIdentity(account_id): AccountIdentity,
) -> Result<Json<OrdersResponse<Execution>>, ApiError>
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
    P: PriceFeedPort,
{
    let orders = state.ledger.executions(&account_id).await?;
    Ok(Json(OrdersResponse { orders }))
}

/// Cash, valued positions and totals.
async fn get_portfolio<L, R, P>(
    State(state): State<AppState<L, R, P>>,
    AccountIdentity(account_id): AccountIdentity,
) -> Result<Json<PortfolioView>, ApiError>
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
    P: PriceFeedPort,
{
    Ok(Json(state.get_portfolio.get(&account_id).await?))
}

/// Register a stop, stop-limit or trailing-stop order.
async fn create_stop_order<L, R, P>(
    State(state): State<AppState<L, R, P>>,
    AccountIdentity(account_id): AccountIdentity,
    payload: Result<Json<StopOrderRequest>, JsonRejection>,
) -> Result<Json<StopOrderResponse>, ApiError>
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
    P: PriceFeedPort,
{
    let new = body(payload)?.into_new_order(account_id)?;
    let order = state.create_conditional_order.create(new).await?;
    Ok(Json(StopOrderResponse {
        message: "Stop order created".to_string(),
        order,
    }))
}

/// The caller's active conditional orders, oldest first.
async fn list_active_orders<L, R, P>(
    State(state): State<AppState<L, R, P>>,
    AccountIdentity(account_id): AccountIdentity,
) -> Result<Json<OrdersResponse<ConditionalOrder>>, ApiError>
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
    P: PriceFeedPort,
{
    let orders = state.registry.list_active(&account_id).await?;
    Ok(Json(OrdersResponse { orders }))
}

/// Cancel one of the caller's active conditional orders.
async fn cancel_stop_order<L, R, P>(
    State(state): State<AppState<L, R, P>>,
    AccountIdentity(account_id): AccountIdentity,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError>
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
    P: PriceFeedPort,
{
    state
        .cancel_conditional_order
        .cancel(&account_id, &ConditionalOrderId::new(id))
        .await?;
    Ok(Json(MessageResponse {
        message: "order cancelled".to_string(),
    }))
}

/// Current price from the feed.
async fn get_stock_price<L, R, P>(
    State(state): State<AppState<L, R, P>>,
    Path(symbol): Path<String>,
) -> Result<Json<QuoteResponse>, ApiError>
where
    L: LedgerStore,
    R: ConditionalOrderRepository,
    P: PriceFeedPort,
{
    let symbol = Symbol::parse(&symbol).map_err(|e| ApiError::invalid_request(e.to_string()))?;

    let price = tokio::time::timeout(state.price_timeout, state.price_feed.get_price(&symbol))
        .await
        .map_err(|_| PriceFeedError::Timeout {
            symbol: symbol.clone(),
            timeout_ms: u64::try_from(state.price_timeout.as_millis()).unwrap_or(u64::MAX),
        })??;

    Ok(Json(QuoteResponse { symbol, price }))
}
