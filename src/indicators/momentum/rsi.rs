//! RSI (Relative Strength Index) indicator

use serde::{Deserialize, Serialize};

use crate::common::math;
use crate::config::RsiParams;
use crate::indicators::error::IndicatorError;
use crate::indicators::registry::{Indicator, IndicatorCategory};
use crate::models::result::{IndicatorResult, Signal};

pub const RSI_NAME: &str = "Relative Strength Index";

/// Value used for the warm-up window and flat markets.
pub const NEUTRAL_RSI: f64 = 50.0;

const DIVERGENCE_WINDOW: usize = 10;
const TREND_WINDOW: usize = 10;
const MIN_TREND_POINTS: usize = 5;

/// Tags attached to an RSI result, in derivation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiSignal {
    Overbought,
    Oversold,
    BullishMomentum,
    BearishMomentum,
    BullishCrossover,
    BearishCrossover,
    Neutral,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiTrend {
    StrongUptrend,
    Uptrend,
    Sideways,
    Downtrend,
    StrongDowntrend,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DivergenceType {
    Bullish,
    Bearish,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    #[serde(rename = "type")]
    pub kind: DivergenceType,
    pub strength: f64,
}

impl Divergence {
    fn none() -> Self {
        Self {
            kind: DivergenceType::None,
            strength: 0.0,
        }
    }
}

pub struct RsiIndicator {
    params: RsiParams,
}

impl RsiIndicator {
    pub fn new(params: RsiParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RsiParams {
        &self.params
    }

    /// Calculate RSI over `prices`.
    ///
    /// Fewer than `period + 1` prices yields a neutral series tagged
    /// `INSUFFICIENT_DATA` with confidence 0.1; an empty series is an error.
    pub fn calculate(&self, prices: &[f64]) -> IndicatorResult {
        IndicatorResult::from_outcome(RSI_NAME, self.try_calculate(prices))
    }

    fn try_calculate(&self, prices: &[f64]) -> Result<IndicatorResult, IndicatorError> {
        let RsiParams {
            period,
            overbought,
            oversold,
        } = self.params;

        if period == 0 {
            return Err(IndicatorError::invalid("period", "must be at least 1"));
        }
        if !(oversold < overbought) {
            return Err(IndicatorError::invalid(
                "thresholds",
                format!("oversold {oversold} must be below overbought {overbought}"),
            ));
        }
        if prices.is_empty() {
            return Err(IndicatorError::EmptyInput("prices"));
        }
        if !math::all_finite(prices) {
            return Err(IndicatorError::NonFinite("prices"));
        }

        let (values, tags, confidence) = if prices.len() < period + 1 {
            (
                vec![NEUTRAL_RSI; prices.len()],
                vec![RsiSignal::InsufficientData],
                0.1,
            )
        } else {
            let values = rsi_series(prices, period);
            let tags = self.generate_signals(&values);
            let confidence = (0.5 + (prices.len() - period) as f64 * 0.01).min(0.95);
            (values, tags, confidence)
        };

        let current = values.last().copied().unwrap_or(NEUTRAL_RSI);
        let (signal, strength) = self.trading_signal(current, &tags);

        Ok(IndicatorResult::new(RSI_NAME, values.clone(), signal, strength, confidence)
            .with_meta("period", period)
            .with_meta("current_rsi", current)
            .with_meta("overbought_threshold", overbought)
            .with_meta("oversold_threshold", oversold)
            .with_meta("trend", determine_trend(&values))
            .with_meta("divergence", check_divergence(prices, &values))
            .with_meta("interpretation", self.interpret(current))
            .with_meta("signals", &tags))
    }

    fn generate_signals(&self, values: &[f64]) -> Vec<RsiSignal> {
        let mut tags = Vec::new();
        let Some(&current) = values.last() else {
            return vec![RsiSignal::Neutral];
        };

        if current >= self.params.overbought {
            tags.push(RsiSignal::Overbought);
        } else if current <= self.params.oversold {
            tags.push(RsiSignal::Oversold);
        }

        if values.len() >= 3 {
            if let Some(slope) = math::linear_slope(&values[values.len() - 3..]) {
                if slope > 1.0 {
                    tags.push(RsiSignal::BullishMomentum);
                } else if slope < -1.0 {
                    tags.push(RsiSignal::BearishMomentum);
                }
            }
        }

        if values.len() >= 2 {
            let previous = values[values.len() - 2];
            if previous < NEUTRAL_RSI && NEUTRAL_RSI < current {
                tags.push(RsiSignal::BullishCrossover);
            } else if previous > NEUTRAL_RSI && NEUTRAL_RSI > current {
                tags.push(RsiSignal::BearishCrossover);
            }
        }

        if tags.is_empty() {
            tags.push(RsiSignal::Neutral);
        }
        tags
    }

    /// Oversold maps to buy and overbought to sell; strength grows with the
    /// distance past the threshold.
    fn trading_signal(&self, current: f64, tags: &[RsiSignal]) -> (Signal, f64) {
        let RsiParams {
            overbought,
            oversold,
            ..
        } = self.params;

        if tags.contains(&RsiSignal::Oversold) {
            let depth = if oversold > 0.0 {
                (oversold - current) / oversold
            } else {
                1.0
            };
            (Signal::Buy, 0.5 + 0.5 * depth.clamp(0.0, 1.0))
        } else if tags.contains(&RsiSignal::Overbought) {
            let room = 100.0 - overbought;
            let depth = if room > 0.0 {
                (current - overbought) / room
            } else {
                1.0
            };
            (Signal::Sell, 0.5 + 0.5 * depth.clamp(0.0, 1.0))
        } else {
            (Signal::Hold, 0.5)
        }
    }

    fn interpret(&self, rsi: f64) -> &'static str {
        if rsi >= 80.0 {
            "Extremely overbought - strong sell signal"
        } else if rsi >= self.params.overbought {
            "Overbought - consider selling"
        } else if rsi >= 60.0 {
            "Bullish momentum - uptrend likely"
        } else if rsi >= 40.0 {
            "Neutral - no clear direction"
        } else if rsi >= self.params.oversold {
            "Bearish momentum - downtrend likely"
        } else if rsi >= 20.0 {
            "Oversold - consider buying"
        } else {
            "Extremely oversold - strong buy signal"
        }
    }
}

impl Default for RsiIndicator {
    fn default() -> Self {
        Self::new(RsiParams::default())
    }
}

impl Indicator for RsiIndicator {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Momentum
    }

    fn name(&self) -> &'static str {
        RSI_NAME
    }
}

/// Calculate RSI with explicit parameters
pub fn calculate_rsi(prices: &[f64], period: usize, overbought: f64, oversold: f64) -> IndicatorResult {
    RsiIndicator::new(RsiParams {
        period,
        overbought,
        oversold,
    })
    .calculate(prices)
}

/// RSI series using Wilder's smoothing, same length as `prices`.
///
/// The first `period + 1` entries are the neutral warm-up value. A window with
/// neither gains nor losses reads 50.
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period + 1 {
        return vec![NEUTRAL_RSI; prices.len()];
    }

    let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    let smoothing = (period - 1) as f64;

    let mut values = Vec::with_capacity(prices.len());
    values.resize(period + 1, NEUTRAL_RSI);

    for i in period..deltas.len() {
        avg_gain = (avg_gain * smoothing + gains[i]) / period as f64;
        avg_loss = (avg_loss * smoothing + losses[i]) / period as f64;
        values.push(rsi_from_averages(avg_gain, avg_loss));
    }

    values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            NEUTRAL_RSI
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

/// Trend of the last (up to) ten RSI values.
pub fn determine_trend(values: &[f64]) -> RsiTrend {
    if values.len() < MIN_TREND_POINTS {
        return RsiTrend::InsufficientData;
    }
    let recent = &values[values.len().saturating_sub(TREND_WINDOW)..];
    let slope = math::linear_slope(recent).unwrap_or(0.0);

    if slope > 2.0 {
        RsiTrend::StrongUptrend
    } else if slope > 0.5 {
        RsiTrend::Uptrend
    } else if slope < -2.0 {
        RsiTrend::StrongDowntrend
    } else if slope < -0.5 {
        RsiTrend::Downtrend
    } else {
        RsiTrend::Sideways
    }
}

/// Compare price and RSI slopes over the last ten points.
pub fn check_divergence(prices: &[f64], values: &[f64]) -> Divergence {
    if prices.len() < DIVERGENCE_WINDOW || values.len() < DIVERGENCE_WINDOW {
        return Divergence::none();
    }

    let price_slope = math::linear_slope(&prices[prices.len() - DIVERGENCE_WINDOW..]);
    let rsi_slope = math::linear_slope(&values[values.len() - DIVERGENCE_WINDOW..]);
    let (Some(price_slope), Some(rsi_slope)) = (price_slope, rsi_slope) else {
        return Divergence::none();
    };

    if price_slope > 0.0 && rsi_slope < -0.5 {
        Divergence {
            kind: DivergenceType::Bearish,
            strength: rsi_slope.abs(),
        }
    } else if price_slope < 0.0 && rsi_slope > 0.5 {
        Divergence {
            kind: DivergenceType::Bullish,
            strength: rsi_slope,
        }
    } else {
        Divergence::none()
    }
}
