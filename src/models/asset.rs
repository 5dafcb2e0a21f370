use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Asset class tag carried by cross-asset calculators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Crypto,
    Stock,
    Forex,
    Futures,
    Index,
    CrossAsset,
}

/// Price history of a single asset, supplied wholesale per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetData {
    pub symbol: String,
    pub asset_class: AssetClass,
    pub current_price: f64,
    pub historical_prices: Vec<f64>,
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlations: Option<HashMap<String, f64>>,
}

impl AssetData {
    pub fn new(symbol: impl Into<String>, asset_class: AssetClass, historical_prices: Vec<f64>) -> Self {
        let current_price = historical_prices.last().copied().unwrap_or(0.0);
        Self {
            symbol: symbol.into(),
            asset_class,
            current_price,
            historical_prices,
            volume: 0.0,
            market_cap: None,
            beta: None,
            correlations: None,
        }
    }

    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = price;
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = Some(market_cap);
        self
    }
}
