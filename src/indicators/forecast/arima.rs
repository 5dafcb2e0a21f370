//! Simplified ARIMA one-step forecast on log returns.
//!
//! The AR term is the slope of a linear fit over the last `p` returns and the
//! MA term the mean of the last `q` returns. Neither is a fitted estimate.

use serde::{Deserialize, Serialize};

use crate::common::math;
use crate::config::ArimaParams;
use crate::indicators::error::IndicatorError;
use crate::indicators::registry::{Indicator, IndicatorCategory};
use crate::models::asset::AssetData;
use crate::models::result::{IndicatorResult, Signal};

pub const ARIMA_NAME: &str = "ARIMA Forecast";

const RESIDUAL_WINDOW: usize = 20;
const REFERENCE_RETURN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    fn from_return(expected_return: f64) -> Self {
        let magnitude = expected_return.abs();
        if magnitude < 0.05 {
            RiskLevel::Low
        } else if magnitude < 0.1 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

pub struct ArimaModel {
    params: ArimaParams,
}

impl ArimaModel {
    pub fn new(params: ArimaParams) -> Self {
        Self { params }
    }

    pub fn calculate(&self, asset: &AssetData) -> IndicatorResult {
        IndicatorResult::from_outcome(ARIMA_NAME, self.try_calculate(asset))
    }

    fn try_calculate(&self, asset: &AssetData) -> Result<IndicatorResult, IndicatorError> {
        let ArimaParams {
            p,
            d,
            q,
            min_observations,
            signal_band,
        } = self.params;

        let prices = &asset.historical_prices;
        let required = min_observations.max(2);
        if prices.len() < required {
            return Err(IndicatorError::InsufficientData {
                required,
                actual: prices.len(),
            });
        }
        if !math::all_finite(prices) || !asset.current_price.is_finite() {
            return Err(IndicatorError::NonFinite("prices"));
        }
        if let Some(&bad) = prices.iter().find(|p| **p <= 0.0) {
            return Err(IndicatorError::NonPositive {
                field: "historical_prices",
                value: bad,
            });
        }
        if asset.current_price <= 0.0 {
            return Err(IndicatorError::NonPositive {
                field: "current_price",
                value: asset.current_price,
            });
        }

        let returns = math::log_returns(prices);
        let last_return = returns.last().copied().unwrap_or(0.0);

        // A single point has no slope, so p < 2 contributes no AR term.
        let ar_coefficient = if p >= 2 && returns.len() > p {
            math::linear_slope(&returns[returns.len() - p..]).unwrap_or(0.0)
        } else {
            0.0
        };
        let ma_coefficient = if q > 0 && returns.len() > q {
            math::mean(&returns[returns.len() - q..]).unwrap_or(0.0)
        } else {
            0.0
        };

        let forecast_log_return = ar_coefficient * last_return + ma_coefficient;
        let forecast_price = asset.current_price * forecast_log_return.exp();
        let expected_return = (forecast_price - asset.current_price) / asset.current_price;

        let window = &returns[returns.len().saturating_sub(RESIDUAL_WINDOW)..];
        let residual_std = math::standard_deviation(window).unwrap_or(0.0);
        if residual_std <= 0.0 {
            return Err(IndicatorError::Degenerate(
                "recent returns have zero variance".to_string(),
            ));
        }
        let interval = 1.96 * residual_std;
        let aic = returns.len() as f64 * (residual_std * residual_std).ln() + 2.0 * (p + q + 1) as f64;

        let (signal, strength) = if expected_return > signal_band {
            (Signal::Buy, expected_return.abs() / REFERENCE_RETURN)
        } else if expected_return < -signal_band {
            (Signal::Sell, expected_return.abs() / REFERENCE_RETURN)
        } else {
            (Signal::Hold, 0.5)
        };
        let confidence = (1.0 - expected_return.abs() / REFERENCE_RETURN).clamp(0.3, 0.8);

        Ok(IndicatorResult::new(ARIMA_NAME, forecast_price, signal, strength, confidence)
            .with_meta("symbol", &asset.symbol)
            .with_meta("forecast_return", expected_return)
            .with_meta("confidence_interval", interval)
            .with_meta("ar_coefficient", ar_coefficient)
            .with_meta("ma_coefficient", ma_coefficient)
            .with_meta("aic", aic)
            .with_meta("order", [p, d, q])
            .with_meta("residual_std", residual_std)
            .with_meta("risk_level", RiskLevel::from_return(expected_return)))
    }
}

impl Default for ArimaModel {
    fn default() -> Self {
        Self::new(ArimaParams::default())
    }
}

impl Indicator for ArimaModel {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Forecast
    }

    fn name(&self) -> &'static str {
        ARIMA_NAME
    }
}
