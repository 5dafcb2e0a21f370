//! Indicator categories and the trait shared by every calculator

use serde::{Deserialize, Serialize};

/// Indicator category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    Momentum,
    Volatility,
    Forecast,
    Trend,
    OnChain,
    Network,
    Learning,
    Sentiment,
}

impl IndicatorCategory {
    /// Get all categories
    pub fn all() -> Vec<IndicatorCategory> {
        vec![
            IndicatorCategory::Momentum,
            IndicatorCategory::Volatility,
            IndicatorCategory::Forecast,
            IndicatorCategory::Trend,
            IndicatorCategory::OnChain,
            IndicatorCategory::Network,
            IndicatorCategory::Learning,
            IndicatorCategory::Sentiment,
        ]
    }
}

/// Trait for all indicators
pub trait Indicator {
    /// Get the category this indicator belongs to
    fn category(&self) -> IndicatorCategory;

    /// Get the name reported in results
    fn name(&self) -> &'static str;
}
