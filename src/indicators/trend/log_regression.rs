//! Logarithmic regression channel
//!
//! Fits a polynomial of log price against elapsed days and builds bands at
//! ±`band_sigmas` residual standard deviations, mapped back to price space.

use chrono::{DateTime, Utc};

use crate::common::math;
use crate::config::LogRegressionParams;
use crate::indicators::error::IndicatorError;
use crate::indicators::registry::{Indicator, IndicatorCategory};
use crate::models::result::{IndicatorResult, Signal};

pub const LOG_REGRESSION_NAME: &str = "Logarithmic Regression";

const LOWER_ZONE: f64 = 0.2;
const UPPER_ZONE: f64 = 0.8;
const MAX_CONFIDENCE: f64 = 0.95;
const SECONDS_PER_DAY: f64 = 86_400.0;

pub struct LogRegressionChannel {
    params: LogRegressionParams,
}

impl LogRegressionChannel {
    pub fn new(params: LogRegressionParams) -> Self {
        Self { params }
    }

    pub fn calculate(&self, prices: &[f64], timestamps: &[DateTime<Utc>]) -> IndicatorResult {
        IndicatorResult::from_outcome(LOG_REGRESSION_NAME, self.try_calculate(prices, timestamps))
    }

    fn try_calculate(
        &self,
        prices: &[f64],
        timestamps: &[DateTime<Utc>],
    ) -> Result<IndicatorResult, IndicatorError> {
        let LogRegressionParams {
            degree,
            band_sigmas,
            min_points,
        } = self.params;

        if prices.len() != timestamps.len() {
            return Err(IndicatorError::LengthMismatch {
                left: "prices",
                left_len: prices.len(),
                right: "timestamps",
                right_len: timestamps.len(),
            });
        }
        let required = min_points.max(degree + 2);
        if prices.len() < required {
            return Err(IndicatorError::InsufficientData {
                required,
                actual: prices.len(),
            });
        }
        if !math::all_finite(prices) {
            return Err(IndicatorError::NonFinite("prices"));
        }
        if let Some(&bad) = prices.iter().find(|p| **p <= 0.0) {
            return Err(IndicatorError::NonPositive {
                field: "prices",
                value: bad,
            });
        }

        let origin = timestamps[0];
        let days: Vec<f64> = timestamps
            .iter()
            .map(|ts| (*ts - origin).num_seconds() as f64 / SECONDS_PER_DAY)
            .collect();
        let span = days.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
        if span <= 0.0 {
            return Err(IndicatorError::Degenerate(
                "timestamps span zero days".to_string(),
            ));
        }
        // Fit on time scaled to [0, 1] to keep the normal equations conditioned.
        let scaled: Vec<f64> = days.iter().map(|d| d / span).collect();
        let log_prices: Vec<f64> = prices.iter().map(|p| p.ln()).collect();

        let coefficients = math::polyfit(&scaled, &log_prices, degree).ok_or_else(|| {
            IndicatorError::Degenerate(format!("degree {degree} fit is singular"))
        })?;

        let fitted: Vec<f64> = scaled.iter().map(|t| math::polyval(&coefficients, *t)).collect();
        let residuals: Vec<f64> = log_prices.iter().zip(&fitted).map(|(y, f)| y - f).collect();
        let residual_std = math::standard_deviation(&residuals).unwrap_or(0.0);
        if residual_std <= 0.0 {
            return Err(IndicatorError::Degenerate(
                "residuals have zero spread".to_string(),
            ));
        }

        let current_fit = fitted[fitted.len() - 1];
        let current_price = prices[prices.len() - 1];
        let regression_value = current_fit.exp();
        let upper_band = (current_fit + band_sigmas * residual_std).exp();
        let lower_band = (current_fit - band_sigmas * residual_std).exp();
        let position = (current_price - lower_band) / (upper_band - lower_band);

        let (signal, strength) = if position < LOWER_ZONE {
            (Signal::Buy, 1.0 - position / LOWER_ZONE)
        } else if position > UPPER_ZONE {
            (Signal::Sell, (position - UPPER_ZONE) / (1.0 - UPPER_ZONE))
        } else {
            (Signal::Hold, 0.5)
        };

        let mean_log = math::mean(&log_prices).unwrap_or(0.0);
        let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
        let ss_tot: f64 = log_prices.iter().map(|y| (y - mean_log).powi(2)).sum();
        let r_squared = 1.0 - ss_res / ss_tot;
        let confidence = r_squared.min(MAX_CONFIDENCE);

        Ok(IndicatorResult::new(LOG_REGRESSION_NAME, position, signal, strength, confidence)
            .with_meta("current_price", current_price)
            .with_meta("regression_value", regression_value)
            .with_meta("upper_band", upper_band)
            .with_meta("lower_band", lower_band)
            .with_meta("residual_std", residual_std)
            .with_meta("r_squared", r_squared)
            .with_meta("degree", degree)
            .with_meta("coefficients", &coefficients)
            .with_meta("time_scale_days", span))
    }
}

impl Default for LogRegressionChannel {
    fn default() -> Self {
        Self::new(LogRegressionParams::default())
    }
}

impl Indicator for LogRegressionChannel {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn name(&self) -> &'static str {
        LOG_REGRESSION_NAME
    }
}
