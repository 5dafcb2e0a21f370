//! Text sentiment classification

pub mod analyzer;
pub mod backend;

pub use analyzer::*;
pub use backend::*;
