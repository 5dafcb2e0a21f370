//! Shared data models spanning the calculators.

pub mod asset;
pub mod result;
pub mod transaction;

pub use asset::{AssetClass, AssetData};
pub use result::{IndicatorResult, IndicatorValue, Metadata, Signal, RESULT_SCHEMA_VERSION};
pub use transaction::{Edge, NodeFeatures, Transaction};
