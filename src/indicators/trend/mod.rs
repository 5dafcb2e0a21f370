//! Trend models: logarithmic regression channel

pub mod log_regression;

pub use log_regression::*;
