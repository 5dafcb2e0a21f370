//! Volatility models: GARCH(1,1)

pub mod garch;

pub use garch::*;
