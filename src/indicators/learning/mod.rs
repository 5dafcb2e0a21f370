//! Reinforcement-learning trading policy

pub mod q_agent;
pub mod quantizer;

pub use q_agent::*;
pub use quantizer::*;
