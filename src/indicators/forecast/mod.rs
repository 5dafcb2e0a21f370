//! Forecast models: ARIMA

pub mod arima;

pub use arima::*;
