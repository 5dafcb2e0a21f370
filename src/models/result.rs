//! Universal calculator output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::indicators::error::IndicatorError;

/// Bumped whenever a field of [`IndicatorResult`] changes meaning.
pub const RESULT_SCHEMA_VERSION: u32 = 1;

/// Auxiliary diagnostics attached to a result.
pub type Metadata = BTreeMap<String, Value>;

/// Trading signal emitted by every calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
            Signal::Hold => "hold",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary value of a result. Oscillators return the full series, everything
/// else a single number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Scalar(f64),
    Series(Vec<f64>),
}

impl IndicatorValue {
    /// Scalar value, or the most recent point of a series.
    pub fn latest(&self) -> Option<f64> {
        match self {
            IndicatorValue::Scalar(v) => Some(*v),
            IndicatorValue::Series(values) => values.last().copied(),
        }
    }

    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            IndicatorValue::Series(values) => Some(values),
            IndicatorValue::Scalar(_) => None,
        }
    }
}

impl From<f64> for IndicatorValue {
    fn from(value: f64) -> Self {
        IndicatorValue::Scalar(value)
    }
}

impl From<Vec<f64>> for IndicatorValue {
    fn from(values: Vec<f64>) -> Self {
        IndicatorValue::Series(values)
    }
}

/// Standardized output of every calculator.
///
/// `confidence` and `strength` always lie in `[0, 1]`; a `confidence` of zero
/// together with an `error` metadata entry marks a failed calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub name: String,
    pub value: IndicatorValue,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
    pub signal: Signal,
    pub strength: f64,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

fn default_schema_version() -> u32 {
    RESULT_SCHEMA_VERSION
}

fn unit_interval(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl IndicatorResult {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<IndicatorValue>,
        signal: Signal,
        strength: f64,
        confidence: f64,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            confidence: unit_interval(confidence),
            timestamp: Utc::now(),
            metadata: Metadata::new(),
            signal,
            strength: unit_interval(strength),
            schema_version: RESULT_SCHEMA_VERSION,
        }
    }

    /// Fail-soft result: value 0, hold, zero strength and confidence.
    pub fn error(name: impl Into<String>, err: &IndicatorError) -> Self {
        let mut result = Self::new(name, 0.0, Signal::Hold, 0.0, 0.0);
        result
            .metadata
            .insert("error".to_string(), Value::String(err.to_string()));
        result
    }

    /// Collapse a fallible calculation into a result, logging the failure.
    pub fn from_outcome(name: &str, outcome: Result<IndicatorResult, IndicatorError>) -> Self {
        match outcome {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(indicator = name, error = %err, "{} calculation failed: {}", name, err);
                Self::error(name, &err)
            }
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn is_error(&self) -> bool {
        self.confidence == 0.0 && self.metadata.contains_key("error")
    }

    pub fn error_message(&self) -> Option<&str> {
        self.metadata.get("error").and_then(Value::as_str)
    }

    pub fn meta_f64(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(Value::as_f64)
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}
