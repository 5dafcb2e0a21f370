use thiserror::Error;

/// Failures raised inside a calculator before they are folded into an error result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{0} contains non-finite values")]
    NonFinite(&'static str),

    #[error("degenerate input: {0}")]
    Degenerate(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("no {0} provided")]
    EmptyInput(&'static str),

    #[error("length mismatch: {left} has {left_len} entries, {right} has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("transaction graph not built")]
    GraphNotBuilt,

    #[error("invalid transaction at index {index}: {reason}")]
    InvalidTransaction { index: usize, reason: String },

    #[error("sentiment backend failure: {0}")]
    Backend(String),
}

impl IndicatorError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        IndicatorError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
