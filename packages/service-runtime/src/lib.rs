#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! Service Runtime - Shared Process Plumbing
//!
//! Everything both binaries need before and after their domain code runs:
//!
//! - `config`: environment lookup helpers, [`ConfigError`] and [`RedisSettings`]
//! - `telemetry`: tracing subscriber with optional OTLP export
//! - `metrics`: the process-wide Prometheus recorder and `/metrics` handler
//! - `process`: `.env` discovery and shutdown signals

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Environment configuration helpers.
pub mod config;

/// Prometheus recorder and exposition handler.
pub mod metrics;

/// `.env` loading and shutdown signals.
pub mod process;

/// Tracing and OpenTelemetry setup.
pub mod telemetry;

pub use config::{ConfigError, RedisSettings};
pub use process::{ShutdownSignal, load_dotenv, shutdown_signal};
pub use telemetry::{TelemetryConfig, TelemetryError, TelemetryGuard};
