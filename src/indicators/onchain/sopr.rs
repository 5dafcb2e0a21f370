//! SOPR (Spent Output Profit Ratio)

use serde::{Deserialize, Serialize};

use crate::common::math;
use crate::indicators::error::IndicatorError;
use crate::models::result::{IndicatorResult, Signal};

pub const SOPR_NAME: &str = "SOPR";
pub const SOPR_TREND_NAME: &str = "SOPR Trend";

const CAPITULATION: f64 = 0.95;
const PROFIT_TAKING: f64 = 1.05;
/// Width of the band over which strength ramps linearly to 1.
const STRENGTH_BAND: f64 = 0.1;
const SOPR_CONFIDENCE: f64 = 0.85;
/// Keeps a flat trend distinguishable from a failed calculation.
const MIN_TREND_CONFIDENCE: f64 = 0.1;

fn sopr_signal(sopr: f64) -> (Signal, f64) {
    if sopr < CAPITULATION {
        (Signal::Buy, ((CAPITULATION - sopr) / STRENGTH_BAND).min(1.0))
    } else if sopr > PROFIT_TAKING {
        (Signal::Sell, ((sopr - PROFIT_TAKING) / STRENGTH_BAND).min(1.0))
    } else {
        (Signal::Hold, 0.5)
    }
}

/// SOPR = profit outputs / (profit outputs + loss outputs).
pub fn calculate_sopr(spent_outputs_profit: f64, spent_outputs_loss: f64) -> IndicatorResult {
    IndicatorResult::from_outcome(
        SOPR_NAME,
        try_calculate_sopr(spent_outputs_profit, spent_outputs_loss),
    )
}

fn try_calculate_sopr(profit: f64, loss: f64) -> Result<IndicatorResult, IndicatorError> {
    if !profit.is_finite() || !loss.is_finite() {
        return Err(IndicatorError::NonFinite("spent outputs"));
    }
    let total = profit + loss;
    if total <= 0.0 {
        return Err(IndicatorError::NonPositive {
            field: "total spent outputs",
            value: total,
        });
    }

    let sopr = profit / total;
    let (signal, strength) = sopr_signal(sopr);

    Ok(IndicatorResult::new(SOPR_NAME, sopr, signal, strength, SOPR_CONFIDENCE)
        .with_meta("spent_outputs_profit", profit)
        .with_meta("spent_outputs_loss", loss)
        .with_meta("total_spent", total))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoprTrend {
    Rising,
    WeaklyRising,
    Sideways,
    WeaklyFalling,
    Falling,
}

impl SoprTrend {
    fn from_fit(slope: f64, r: f64) -> Self {
        if r.abs() < 0.3 {
            SoprTrend::Sideways
        } else if slope > 0.0 {
            if r > 0.5 {
                SoprTrend::Rising
            } else {
                SoprTrend::WeaklyRising
            }
        } else if r < -0.5 {
            SoprTrend::Falling
        } else {
            SoprTrend::WeaklyFalling
        }
    }
}

/// Direction of the last `window` SOPR readings.
///
/// The signal applies the single-reading thresholds to the latest value;
/// confidence is the fit's |r| bounded to `[0.1, 0.85]`.
pub fn sopr_trend(history: &[f64], window: usize) -> IndicatorResult {
    IndicatorResult::from_outcome(SOPR_TREND_NAME, try_sopr_trend(history, window))
}

fn try_sopr_trend(history: &[f64], window: usize) -> Result<IndicatorResult, IndicatorError> {
    if window < 2 {
        return Err(IndicatorError::invalid("window", "must be at least 2"));
    }
    if history.len() < window {
        return Err(IndicatorError::InsufficientData {
            required: window,
            actual: history.len(),
        });
    }
    if !math::all_finite(history) {
        return Err(IndicatorError::NonFinite("sopr history"));
    }

    let recent = &history[history.len() - window..];
    let (slope, r) = math::linregress(recent)
        .ok_or_else(|| IndicatorError::Degenerate("trend fit failed".to_string()))?;
    let latest = recent[recent.len() - 1];
    let (signal, strength) = sopr_signal(latest);
    let confidence = r.abs().clamp(MIN_TREND_CONFIDENCE, SOPR_CONFIDENCE);

    Ok(IndicatorResult::new(SOPR_TREND_NAME, latest, signal, strength, confidence)
        .with_meta("trend", SoprTrend::from_fit(slope, r))
        .with_meta("slope", slope)
        .with_meta("r_value", r)
        .with_meta("window", window))
}
