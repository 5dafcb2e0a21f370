//! Chainsight indicator engine.
//!
//! Independent calculators that turn price, on-chain, transaction-graph and
//! text data into a standardized [`IndicatorResult`]. Every calculator is
//! fail-soft: failures come back as a result with `confidence == 0` and an
//! `error` entry in its metadata.

pub mod common;
pub mod config;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;

pub use indicators::IndicatorError;
pub use models::result::{IndicatorResult, IndicatorValue, Signal};
