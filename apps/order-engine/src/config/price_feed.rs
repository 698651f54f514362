//! Price feed configuration.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which price feed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFeedKind {
    /// Random walk around configured base prices.
    #[default]
    Simulated,
}

/// Price feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeedConfig {
    /// Feed implementation.
    #[serde(default)]
    pub kind: PriceFeedKind,
    /// Largest move per lookup, in percent.
    #[serde(default = "default_volatility_percent")]
    pub volatility_percent: Decimal,
    /// Starting price for symbols missing from `base_prices`.
    #[serde(default = "default_price")]
    pub default_price: Decimal,
    /// Starting prices by symbol.
    #[serde(default = "default_base_prices")]
    pub base_prices: HashMap<String, Decimal>,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            kind: PriceFeedKind::default(),
            volatility_percent: default_volatility_percent(),
            default_price: default_price(),
            base_prices: default_base_prices(),
        }
    }
}

fn default_volatility_percent() -> Decimal {
    Decimal::TWO
}

fn default_price() -> Decimal {
    Decimal::ONE_HUNDRED
}

fn default_base_prices() -> HashMap<String, Decimal> {
    HashMap::from([
        ("AAPL".to_string(), Decimal::new(17_550, 2)),
        ("GOOGL".to_string(), Decimal::new(13_825, 2)),
        ("MSFT".to_string(), Decimal::new(33_080, 2)),
        ("TSLA".to_string(), Decimal::new(21_075, 2)),
        ("AMZN".to_string(), Decimal::new(17_890, 2)),
    ])
}
