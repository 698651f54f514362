//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::shared::AccountId;
use crate::error::ApiError;

/// Header carrying the caller's account identifier.
pub const ACCOUNT_HEADER: &str = "x-account-id";

/// Account the request acts on.
///
/// Rejects with `401` when the header is missing, blank or not UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountIdentity(pub AccountId);

impl<S> FromRequestParts<S> for AccountIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACCOUNT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Self(AccountId::new(value)))
            .ok_or_else(ApiError::unauthenticated)
    }
}
