//! API error mapping.
//!
//! Every failure leaving the HTTP surface carries a stable upper-snake code
//! and a human-readable message.
//!
//! | Code | HTTP | Usage |
//! |------|------|-------|
//! | `INVALID_REQUEST` | 400 | Malformed body, header or path |
//! | `INVALID_ORDER` | 400 | Order fields rejected by validation or out of numeric range |
//! | `INSUFFICIENT_FUNDS` | 400 | Buy notional exceeds cash |
//! | `INSUFFICIENT_SHARES` | 400 | Sell quantity exceeds holding |
//! | `NO_POSITION` | 400 | Sell of a symbol never held |
//! | `NOT_FOUND` | 400 | Conditional order missing or not the caller's |
//! | `ALREADY_TERMINAL` | 400 | Conditional order already left `active` |
//! | `UNAUTHENTICATED` | 401 | No account identity on the request |
//! | `ACCOUNT_NOT_FOUND` | 404 | Unknown account under the `reject` policy |
//! | `ACCOUNT_EXISTS` | 409 | Explicit open of an existing account |
//! | `FEED_UNAVAILABLE` | 503 | No price available for the symbol |
//! | `INTERNAL_ERROR` | 500 | Storage or other unexpected failure |

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::ports::PriceFeedError;
use crate::domain::conditional_orders::ConditionalOrderError;
use crate::domain::ledger::LedgerError;
use crate::domain::order_execution::ExecutionError;

/// Error codes exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed request.
    InvalidRequest,
    /// Order fields failed validation.
    InvalidOrder,
    /// Not enough cash.
    InsufficientFunds,
    /// Not enough shares.
    InsufficientShares,
    /// Symbol not held.
    NoPosition,
    /// Conditional order not found.
    NotFound,
    /// Conditional order no longer active.
    AlreadyTerminal,
    /// Missing account identity.
    Unauthenticated,
    /// Unknown account.
    AccountNotFound,
    /// Account already open.
    AccountExists,
    /// Price feed failure.
    FeedUnavailable,
    /// Anything else.
    InternalError,
}

impl ErrorCode {
    /// HTTP status for this code.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest
            | Self::InvalidOrder
            | Self::InsufficientFunds
            | Self::InsufficientShares
            | Self::NoPosition
            | Self::NotFound
            | Self::AlreadyTerminal => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::AccountNotFound => StatusCode::NOT_FOUND,
            Self::AccountExists => StatusCode::CONFLICT,
            Self::FeedUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire string for this code.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InvalidOrder => "INVALID_ORDER",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::InsufficientShares => "INSUFFICIENT_SHARES",
            Self::NoPosition => "NO_POSITION",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyTerminal => "ALREADY_TERMINAL",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::AccountExists => "ACCOUNT_EXISTS",
            Self::FeedUnavailable => "FEED_UNAVAILABLE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

impl From<&LedgerError> for ErrorCode {
    fn from(err: &LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds { .. } => Self::InsufficientFunds,
            LedgerError::InsufficientShares { .. } => Self::InsufficientShares,
            LedgerError::NoPosition { .. } => Self::NoPosition,
            LedgerError::OutOfRange { .. } => Self::InvalidOrder,
            LedgerError::AccountNotFound { .. } => Self::AccountNotFound,
            LedgerError::AccountExists { .. } => Self::AccountExists,
            LedgerError::Storage { .. } => Self::InternalError,
        }
    }
}

impl From<&ExecutionError> for ErrorCode {
    fn from(err: &ExecutionError) -> Self {
        match err {
            ExecutionError::InvalidOrder { .. } => Self::InvalidOrder,
            ExecutionError::Ledger(inner) => inner.into(),
        }
    }
}

impl From<&ConditionalOrderError> for ErrorCode {
    fn from(err: &ConditionalOrderError) -> Self {
        match err {
            ConditionalOrderError::InvalidOrder { .. } => Self::InvalidOrder,
            ConditionalOrderError::InsufficientShares { .. } => Self::InsufficientShares,
            ConditionalOrderError::NotFound { .. } => Self::NotFound,
            ConditionalOrderError::AlreadyTerminal { .. } => Self::AlreadyTerminal,
            ConditionalOrderError::Ledger(inner) => inner.into(),
            ConditionalOrderError::NotTriggered { .. }
            | ConditionalOrderError::FillInProgress { .. }
            | ConditionalOrderError::FillNotClaimed { .. }
            | ConditionalOrderError::AlreadyFilled { .. }
            | ConditionalOrderError::Storage { .. } => Self::InternalError,
        }
    }
}

impl From<&PriceFeedError> for ErrorCode {
    fn from(_: &PriceFeedError) -> Self {
        Self::FeedUnavailable
    }
}

/// Error returned by HTTP handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{}] {message}", .code.reason())]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    /// Create an error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Malformed request.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Missing account identity.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::new(ErrorCode::Unauthenticated, "missing account identity")
    }

    /// The error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// The message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Response body.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.message.clone(),
            code: self.code.reason().to_string(),
        }
    }
}

macro_rules! api_error_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for ApiError {
                fn from(err: $source) -> Self {
                    Self::new(ErrorCode::from(&err), err.to_string())
                }
            }
        )*
    };
}

api_error_from!(LedgerError, ExecutionError, ConditionalOrderError, PriceFeedError);

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Stable error code.
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        if status.is_server_error() {
            tracing::error!(code = %self.code, error = %self.message, "Request failed");
        } else {
            tracing::debug!(code = %self.code, error = %self.message, "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
