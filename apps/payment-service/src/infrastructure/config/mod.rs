//! Configuration Module
//!
//! Environment-driven configuration for the payment service.

mod settings;

pub use service_runtime::{ConfigError, RedisSettings};
pub use settings::{PaymentConfig, ServerSettings};
