//! Scripted price feed for tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::application::ports::{PriceFeedError, PriceFeedPort};
use crate::domain::shared::Symbol;

#[derive(Debug, Clone, Copy)]
enum Script {
    Price(Decimal),
    Fail,
    Stall(Duration),
}

/// Price feed whose answers are set by the test.
///
/// Symbols with no script are unavailable.
#[derive(Debug, Default)]
pub struct MockPriceFeed {
    scripts: RwLock<HashMap<String, Script>>,
}

impl MockPriceFeed {
    /// Create a feed with no prices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `price` for `symbol`.
    pub fn set_price(&self, symbol: &str, price: Decimal) {
        self.script(symbol, Script::Price(price));
    }

    /// Fail every lookup for `symbol`.
    pub fn fail_symbol(&self, symbol: &str) {
        self.script(symbol, Script::Fail);
    }

    /// Sleep for `delay` before failing lookups for `symbol`.
    pub fn stall_symbol(&self, symbol: &str, delay: Duration) {
        self.script(symbol, Script::Stall(delay));
    }

    fn script(&self, symbol: &str, script: Script) {
        self.scripts
            .write()
            .insert(symbol.to_ascii_uppercase(), script);
    }
}

#[async_trait]
impl PriceFeedPort for MockPriceFeed {
    async fn get_price(&self, symbol: &Symbol) -> Result<Decimal, PriceFeedError> {
        let script = self.scripts.read().get(symbol.as_str()).copied();
        match script {
            Some(Script::Price(price)) => Ok(price),
            Some(Script::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Err(unavailable(symbol, "stalled"))
            }
            Some(Script::Fail) => Err(unavailable(symbol, "scripted failure")),
            None => Err(unavailable(symbol, "no price set")),
        }
    }
}

fn unavailable(symbol: &Symbol, message: &str) -> PriceFeedError {
    PriceFeedError::Unavailable {
        symbol: symbol.clone(),
        message: message.to_string(),
    }
}
