//! Application layer.
//!
//! - `services`: the long-running payment evaluator

/// Long-running services.
pub mod services;
