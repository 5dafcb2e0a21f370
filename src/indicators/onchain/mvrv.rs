//! MVRV (Market Value to Realized Value)

use serde::{Deserialize, Serialize};

use crate::common::math;
use crate::indicators::error::IndicatorError;
use crate::models::result::{IndicatorResult, Signal};

pub const MVRV_NAME: &str = "MVRV Ratio";
pub const MVRV_CYCLE_NAME: &str = "MVRV Z-Score";

const UNDERVALUED: f64 = 1.0;
const OVERVALUED: f64 = 3.7;
/// Width of the range over which sell strength ramps from 0 to 1.
const OVERVALUED_RANGE: f64 = 2.0;
const MVRV_CONFIDENCE: f64 = 0.9;

const MIN_Z_SCORE_HISTORY: usize = 30;
const MIN_BAND_HISTORY: usize = 10;
const EUPHORIA_Z: f64 = 3.5;
const CAPITULATION_Z: f64 = -1.5;
const CYCLE_CONFIDENCE: f64 = 0.8;

/// MVRV = market cap / realized cap.
pub fn calculate_mvrv(market_cap: f64, realized_cap: f64) -> IndicatorResult {
    IndicatorResult::from_outcome(MVRV_NAME, try_calculate_mvrv(market_cap, realized_cap))
}

fn try_calculate_mvrv(market_cap: f64, realized_cap: f64) -> Result<IndicatorResult, IndicatorError> {
    if !market_cap.is_finite() || !realized_cap.is_finite() {
        return Err(IndicatorError::NonFinite("market_cap/realized_cap"));
    }
    if realized_cap <= 0.0 {
        return Err(IndicatorError::NonPositive {
            field: "realized_cap",
            value: realized_cap,
        });
    }
    if market_cap < 0.0 {
        return Err(IndicatorError::invalid("market_cap", "must not be negative"));
    }

    let mvrv = market_cap / realized_cap;
    let (signal, strength) = if mvrv < UNDERVALUED {
        (Signal::Buy, 1.0 - mvrv)
    } else if mvrv > OVERVALUED {
        (Signal::Sell, ((mvrv - OVERVALUED) / OVERVALUED_RANGE).min(1.0))
    } else {
        (Signal::Hold, 0.5)
    };

    Ok(IndicatorResult::new(MVRV_NAME, mvrv, signal, strength, MVRV_CONFIDENCE)
        .with_meta("market_cap", market_cap)
        .with_meta("realized_cap", realized_cap))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPhase {
    ExtremeEuphoria,
    Euphoria,
    Optimism,
    Neutral,
    Pessimism,
    ExtremeFear,
}

impl MarketPhase {
    pub fn from_z_score(z: f64) -> Self {
        if z > 7.0 {
            MarketPhase::ExtremeEuphoria
        } else if z > EUPHORIA_Z {
            MarketPhase::Euphoria
        } else if z > 1.0 {
            MarketPhase::Optimism
        } else if z > -0.5 {
            MarketPhase::Neutral
        } else if z > CAPITULATION_Z {
            MarketPhase::Pessimism
        } else {
            MarketPhase::ExtremeFear
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MvrvBands {
    pub bottom: f64,
    pub low: f64,
    pub fair: f64,
    pub high: f64,
    pub top: f64,
}

impl MvrvBands {
    /// 5/25/50/75/95 percentiles; `None` with fewer than ten samples.
    pub fn from_history(history: &[f64]) -> Option<Self> {
        if history.len() < MIN_BAND_HISTORY {
            return None;
        }
        Some(Self {
            bottom: math::percentile(history, 5.0)?,
            low: math::percentile(history, 25.0)?,
            fair: math::percentile(history, 50.0)?,
            high: math::percentile(history, 75.0)?,
            top: math::percentile(history, 95.0)?,
        })
    }
}

/// Position of the latest MVRV within its own history.
pub fn mvrv_cycle(history: &[f64]) -> IndicatorResult {
    IndicatorResult::from_outcome(MVRV_CYCLE_NAME, try_mvrv_cycle(history))
}

fn try_mvrv_cycle(history: &[f64]) -> Result<IndicatorResult, IndicatorError> {
    if history.len() < MIN_Z_SCORE_HISTORY {
        return Err(IndicatorError::InsufficientData {
            required: MIN_Z_SCORE_HISTORY,
            actual: history.len(),
        });
    }
    if !math::all_finite(history) {
        return Err(IndicatorError::NonFinite("mvrv history"));
    }

    let current = history[history.len() - 1];
    let mean = math::mean(history).unwrap_or(0.0);
    let std = math::standard_deviation(history).unwrap_or(0.0);
    if std <= 0.0 {
        return Err(IndicatorError::Degenerate(
            "mvrv history has zero variance".to_string(),
        ));
    }

    let z_score = (current - mean) / std;
    let percentile = history.iter().filter(|v| **v <= current).count() as f64
        / history.len() as f64
        * 100.0;

    let (signal, strength) = if z_score > EUPHORIA_Z {
        (Signal::Sell, (z_score - EUPHORIA_Z) / EUPHORIA_Z)
    } else if z_score < CAPITULATION_Z {
        (Signal::Buy, (CAPITULATION_Z - z_score) / CAPITULATION_Z.abs())
    } else {
        (Signal::Hold, 0.5)
    };

    Ok(
        IndicatorResult::new(MVRV_CYCLE_NAME, z_score, signal, strength, CYCLE_CONFIDENCE)
            .with_meta("current_mvrv", current)
            .with_meta("percentile", percentile)
            .with_meta("market_phase", MarketPhase::from_z_score(z_score))
            .with_meta("bands", MvrvBands::from_history(history))
            .with_meta("samples", history.len()),
    )
}
