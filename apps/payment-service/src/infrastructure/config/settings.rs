//! Payment Service Configuration Settings
//!
//! Loaded from environment variables.

use std::str::FromStr;

use rust_decimal::Decimal;
use service_runtime::config::{env_lookup, parse_or};
use service_runtime::{ConfigError, RedisSettings};

use crate::domain::DEFAULT_FAILURE_THRESHOLD;

/// HTTP server settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSettings {
    /// Health/metrics HTTP port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 8081 }
    }
}

/// Complete payment service configuration.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Message bus connection.
    pub redis: RedisSettings,
    /// HTTP server.
    pub server: ServerSettings,
    /// Amounts strictly above this are declined.
    pub failure_threshold: Decimal,
}

impl PaymentConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but empty or unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let redis = RedisSettings::from_lookup(&lookup)?;
        let server = ServerSettings {
            port: parse_or(
                &lookup,
                "PAYMENT_SERVICE_PORT",
                ServerSettings::default().port,
            )?,
        };

        let failure_threshold = match lookup("PAYMENT_FAILURE_THRESHOLD") {
            None => DEFAULT_FAILURE_THRESHOLD,
            Some(raw) => Decimal::from_str(raw.trim())
                .ok()
                .filter(|value| !value.is_sign_negative())
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "PAYMENT_FAILURE_THRESHOLD".to_string(),
                    value: raw,
                })?,
        };

        Ok(Self {
            redis,
            server,
            failure_threshold,
        })
    }
}
