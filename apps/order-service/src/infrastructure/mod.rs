//! Infrastructure Layer - Adapters and process plumbing.

/// Environment configuration.
pub mod config;

/// REST API.
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Order and product stores.
pub mod persistence;

/// Tracing and OpenTelemetry setup.
pub mod telemetry;
