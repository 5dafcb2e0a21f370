//! Transaction graph analysis

pub mod graph;

pub use graph::*;
