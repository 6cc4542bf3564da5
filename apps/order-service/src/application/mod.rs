//! Application layer.
//!
//! - `use_cases`: order creation
//! - `services`: payment result reconciliation and product catalogue

/// Request-driven use cases.
pub mod use_cases;

/// Long-running and catalogue services.
pub mod services;
