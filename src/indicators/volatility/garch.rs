//! GARCH(1,1) conditional volatility
//!
//! σ²ₜ = ω + α·ε²ₜ₋₁ + β·σ²ₜ₋₁, seeded with the sample variance of log returns.
//! Parameters come from [`GarchParams`] and are not estimated from the data.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::math;
use crate::config::GarchParams;
use crate::indicators::error::IndicatorError;
use crate::indicators::registry::{Indicator, IndicatorCategory};
use crate::models::asset::AssetData;
use crate::models::result::{IndicatorResult, Signal};

pub const GARCH_NAME: &str = "GARCH Volatility";

const HIGH_VOL_RATIO: f64 = 1.5;
const LOW_VOL_RATIO: f64 = 0.7;
const RECENT_VARIANCES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityRegime {
    High,
    Normal,
    Low,
}

impl VolatilityRegime {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > HIGH_VOL_RATIO {
            VolatilityRegime::High
        } else if ratio < LOW_VOL_RATIO {
            VolatilityRegime::Low
        } else {
            VolatilityRegime::Normal
        }
    }
}

/// Coefficients actually used by the recursion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GarchCoefficients {
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
    /// Set when the configured pair was non-stationary and got replaced.
    pub adjusted: bool,
}

impl GarchCoefficients {
    /// Enforce `alpha + beta < 1` by falling back to the configured pair.
    pub fn enforce_stationarity(params: &GarchParams) -> Result<Self, IndicatorError> {
        if !(params.omega > 0.0) || !params.omega.is_finite() {
            return Err(IndicatorError::NonPositive {
                field: "omega",
                value: params.omega,
            });
        }
        if params.alpha < 0.0 || params.beta < 0.0 {
            return Err(IndicatorError::invalid("alpha/beta", "must be non-negative"));
        }

        if params.alpha + params.beta < 1.0 {
            return Ok(Self {
                omega: params.omega,
                alpha: params.alpha,
                beta: params.beta,
                adjusted: false,
            });
        }

        warn!(
            alpha = params.alpha,
            beta = params.beta,
            "GARCH parameters are non-stationary, substituting fallback pair"
        );
        if params.fallback_alpha < 0.0
            || params.fallback_beta < 0.0
            || params.fallback_alpha + params.fallback_beta >= 1.0
        {
            return Err(IndicatorError::invalid(
                "fallback_alpha/fallback_beta",
                "fallback pair must be non-negative and sum below 1",
            ));
        }
        Ok(Self {
            omega: params.omega,
            alpha: params.fallback_alpha,
            beta: params.fallback_beta,
            adjusted: true,
        })
    }

    /// Unconditional variance ω / (1 − α − β).
    pub fn long_run_variance(&self) -> f64 {
        self.omega / (1.0 - self.alpha - self.beta)
    }
}

/// Conditional variance path for `returns`, one entry per return.
pub fn conditional_variances(returns: &[f64], coefficients: &GarchCoefficients) -> Vec<f64> {
    let mut sigma2 = math::variance(returns).unwrap_or(0.0);
    returns
        .iter()
        .map(|r| {
            sigma2 = coefficients.omega + coefficients.alpha * r * r + coefficients.beta * sigma2;
            sigma2
        })
        .collect()
}

pub struct GarchModel {
    params: GarchParams,
}

impl GarchModel {
    pub fn new(params: GarchParams) -> Self {
        Self { params }
    }

    pub fn calculate(&self, asset: &AssetData) -> IndicatorResult {
        IndicatorResult::from_outcome(GARCH_NAME, self.try_calculate(asset))
    }

    fn try_calculate(&self, asset: &AssetData) -> Result<IndicatorResult, IndicatorError> {
        if self.params.p != 1 || self.params.q != 1 {
            return Err(IndicatorError::invalid(
                "order",
                format!("GARCH({},{}) is not supported, only (1,1)", self.params.p, self.params.q),
            ));
        }

        let prices = &asset.historical_prices;
        if prices.len() < self.params.min_observations.max(2) {
            return Err(IndicatorError::InsufficientData {
                required: self.params.min_observations.max(2),
                actual: prices.len(),
            });
        }
        if !math::all_finite(prices) {
            return Err(IndicatorError::NonFinite("historical_prices"));
        }
        if let Some(&bad) = prices.iter().find(|p| **p <= 0.0) {
            return Err(IndicatorError::NonPositive {
                field: "historical_prices",
                value: bad,
            });
        }

        let returns = math::log_returns(prices);
        let sample_variance = math::variance(&returns).unwrap_or(0.0);
        if sample_variance <= 0.0 {
            return Err(IndicatorError::Degenerate(
                "log returns have zero variance".to_string(),
            ));
        }

        let coefficients = GarchCoefficients::enforce_stationarity(&self.params)?;
        let variances = conditional_variances(&returns, &coefficients);
        let annualization = self.params.periods_per_year;

        let last_variance = variances.last().copied().unwrap_or(sample_variance);
        let last_return = returns.last().copied().unwrap_or(0.0);
        let current_volatility = (last_variance * annualization).sqrt();

        let forecast_variance = coefficients.omega
            + coefficients.alpha * last_return * last_return
            + coefficients.beta * last_variance;
        let forecast_volatility = (forecast_variance * annualization).sqrt();

        let long_term_volatility = (coefficients.long_run_variance() * annualization).sqrt();
        let ratio = current_volatility / long_term_volatility;
        let regime = VolatilityRegime::from_ratio(ratio);

        let (signal, strength) = match regime {
            VolatilityRegime::High => (Signal::Sell, (ratio - 1.0).abs().min(1.0)),
            VolatilityRegime::Low => (Signal::Buy, (ratio - 1.0).abs().min(1.0)),
            VolatilityRegime::Normal => (Signal::Hold, 0.5),
        };
        let confidence = (1.0 - (ratio - 1.0).abs()).clamp(0.4, 0.8);

        let residual_statistic: f64 = returns
            .iter()
            .zip(&variances)
            .map(|(r, v)| r * r / v)
            .sum();
        let recent: Vec<f64> = variances[variances.len().saturating_sub(RECENT_VARIANCES)..].to_vec();

        Ok(IndicatorResult::new(GARCH_NAME, current_volatility, signal, strength, confidence)
            .with_meta("symbol", &asset.symbol)
            .with_meta("forecast_volatility", forecast_volatility)
            .with_meta("long_term_volatility", long_term_volatility)
            .with_meta("volatility_ratio", ratio)
            .with_meta("regime", regime)
            .with_meta("omega", coefficients.omega)
            .with_meta("alpha", coefficients.alpha)
            .with_meta("beta", coefficients.beta)
            .with_meta("stationarity_adjusted", coefficients.adjusted)
            .with_meta("standardized_residual_statistic", residual_statistic)
            .with_meta("conditional_variances", recent))
    }
}

impl Default for GarchModel {
    fn default() -> Self {
        Self::new(GarchParams::default())
    }
}

impl Indicator for GarchModel {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volatility
    }

    fn name(&self) -> &'static str {
        GARCH_NAME
    }
}
