//! Price Feed Port (Driven Port)
//!
//! Source of the last traded price per symbol. Prices may be stale or
//! simulated; the engine only needs a number or a failure.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::shared::Symbol;

/// Price feed failure. Never fatal: callers skip and retry later.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceFeedError {
    /// The feed has no usable price for the symbol.
    #[error("price unavailable for {symbol}: {message}")]
    Unavailable {
        /// Symbol requested.
        symbol: Symbol,
        /// Error details.
        message: String,
    },

    /// The lookup did not answer in time.
    #[error("price lookup for {symbol} timed out after {timeout_ms}ms")]
    Timeout {
        /// Symbol requested.
        symbol: Symbol,
        /// Timeout applied.
        timeout_ms: u64,
    },
}

/// Last-price lookup.
#[async_trait]
pub trait PriceFeedPort: Send + Sync {
    /// Current price for `symbol`.
    ///
    /// # Errors
    ///
    /// [`PriceFeedError`] when no price can be produced.
    async fn get_price(&self, symbol: &Symbol) -> Result<Decimal, PriceFeedError>;
}
