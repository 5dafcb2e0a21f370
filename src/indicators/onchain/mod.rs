//! On-chain valuation ratios: MVRV, SOPR

pub mod mvrv;
pub mod sopr;

pub use mvrv::*;
pub use sopr::*;
