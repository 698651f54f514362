//! Simulated price feed.
//!
//! Each lookup moves the symbol's last price by a uniform random step of at
//! most `volatility_percent` and returns the new price. Unknown symbols start
//! from the default price. At most [`DEFAULT_SYMBOL_LIMIT`] symbols keep a
//! walk; lookups beyond that are quoted from the default price without being
//! remembered.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::application::ports::{PriceFeedError, PriceFeedPort};
use crate::domain::shared::Symbol;

/// Smallest price the walk can reach.
const PRICE_FLOOR: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Symbols whose walk is remembered, base prices included.
pub const DEFAULT_SYMBOL_LIMIT: usize = 1_024;

/// Random-walk price feed.
#[derive(Debug)]
pub struct SimulatedPriceFeed {
    prices: Mutex<HashMap<Symbol, Decimal>>,
    default_price: Decimal,
    max_step_bps: i64,
    symbol_limit: usize,
}

impl SimulatedPriceFeed {
    /// Create a feed seeded with `base_prices`.
    #[must_use]
    pub fn new(
        base_prices: HashMap<String, Decimal>,
        default_price: Decimal,
        volatility_percent: Decimal,
    ) -> Self {
        let prices = base_prices
            .into_iter()
            .map(|(symbol, price)| (Symbol::new(symbol), price))
            .collect();
        let max_step_bps = (volatility_percent * Decimal::ONE_HUNDRED)
            .trunc()
            .to_i64()
            .unwrap_or(0)
            .max(0);

        Self {
            prices: Mutex::new(prices),
            default_price,
            max_step_bps,
            symbol_limit: DEFAULT_SYMBOL_LIMIT,
        }
    }

    /// Override how many symbols keep a walk.
    #[must_use]
    pub const fn with_symbol_limit(mut self, limit: usize) -> Self {
        self.symbol_limit = limit;
        self
    }

    /// Number of symbols currently tracked.
    #[must_use]
    pub fn tracked_symbols(&self) -> usize {
        self.prices.lock().len()
    }

    /// Last price produced for `symbol`, without moving it.
    #[must_use]
    pub fn last_price(&self, symbol: &Symbol) -> Option<Decimal> {
        self.prices.lock().get(symbol).copied()
    }

    fn step(&self, last: Decimal) -> Decimal {
        if self.max_step_bps == 0 {
            return last;
        }
        let bps = rand::rng().random_range(-self.max_step_bps..=self.max_step_bps);
        let moved = last + last * Decimal::new(bps, 4);
        moved.round_dp(2).max(PRICE_FLOOR)
    }
}

#[async_trait]
impl PriceFeedPort for SimulatedPriceFeed {
    async fn get_price(&self, symbol: &Symbol) -> Result<Decimal, PriceFeedError> {
        let mut prices = self.prices.lock();
        let price = if let Some(last) = prices.get_mut(symbol) {
            *last = self.step(*last);
            *last
        } else if prices.len() < self.symbol_limit {
            let price = self.step(self.default_price);
            prices.insert(symbol.clone(), price);
            price
        } else {
            self.step(self.default_price)
        };
        drop(prices);

        tracing::debug!(symbol = %symbol, price = %price, "Simulated price");
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn feed(volatility: Decimal) -> SimulatedPriceFeed {
        SimulatedPriceFeed::new(
            HashMap::from([("AAPL".to_string(), dec!(175.50))]),
            dec!(100),
            volatility,
        )
    }

    #[tokio::test]
    async fn steps_stay_within_volatility_band() {
        let feed = feed(dec!(2));
        let aapl = Symbol::new("AAPL");

        let mut last = dec!(175.50);
        for _ in 0..200 {
            let price = feed.get_price(&aapl).await.unwrap();
            let bound = (last * dec!(0.02)).round_dp(2) + dec!(0.01);
            assert!((price - last).abs() <= bound, "{last} -> {price}");
            last = price;
        }
        assert_eq!(feed.last_price(&aapl), Some(last));
    }

    #[tokio::test]
    async fn unknown_symbol_starts_at_default() {
        let feed = feed(Decimal::ZERO);
        let price = feed.get_price(&Symbol::new("NVDA")).await.unwrap();
        assert_eq!(price, dec!(100));
    }

    #[tokio::test]
    async fn zero_volatility_is_constant() {
        let feed = feed(Decimal::ZERO);
        let aapl = Symbol::new("AAPL");
        for _ in 0..5 {
            assert_eq!(feed.get_price(&aapl).await.unwrap(), dec!(175.50));
        }
    }

    #[tokio::test]
    async fn untracked_symbols_beyond_limit_are_not_remembered() {
        let feed = feed(Decimal::ZERO).with_symbol_limit(2);

        feed.get_price(&Symbol::new("NVDA")).await.unwrap();
        assert_eq!(feed.tracked_symbols(), 2);

        for ticker in ["AMD", "INTC", "ORCL"] {
            let price = feed.get_price(&Symbol::new(ticker)).await.unwrap();
            assert_eq!(price, dec!(100));
        }
        assert_eq!(feed.tracked_symbols(), 2);
        assert_eq!(feed.last_price(&Symbol::new("AMD")), None);

        // Tracked symbols keep walking.
        assert_eq!(feed.get_price(&Symbol::new("AAPL")).await.unwrap(), dec!(175.50));
        assert_eq!(feed.last_price(&Symbol::new("NVDA")), Some(dec!(100)));
    }
}
