//! Configuration Module
//!
//! Environment-driven configuration for the order service.

mod settings;

pub use service_runtime::{ConfigError, RedisSettings};
pub use settings::{DatabaseSettings, OrderConfig, ServerSettings};
