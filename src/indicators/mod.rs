pub mod error;
pub mod registry;

pub mod forecast;
pub mod learning;
pub mod momentum;
pub mod network;
pub mod onchain;
pub mod sentiment;
pub mod trend;
pub mod volatility;

pub use error::IndicatorError;
pub use registry::*;
