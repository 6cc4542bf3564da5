#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Payment Service - Payment Evaluator
//!
//! Consumes payment requests from the message bus, decides each one with a
//! fixed amount threshold and publishes the decision back.
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: `PaymentPolicy`, the pure decision rule
//! - **Application**: `PaymentEvaluator`, the consume/decide/publish loop
//! - **Infrastructure**: configuration, health server, metrics, telemetry
//!
//! # Data Flow
//!
//! ```text
//! payment_requests ──► PaymentEvaluator ──► PaymentPolicy
//!                            │
//!                            └──► payment_results
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - the payment decision rule.
pub mod domain;

/// Application layer - the evaluator service.
pub mod application;

/// Infrastructure layer - adapters and process plumbing.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::services::{EvaluationOutcome, EvaluatorStats, PaymentEvaluator};
pub use domain::{DEFAULT_FAILURE_THRESHOLD, PaymentPolicy};
pub use infrastructure::config::{ConfigError, PaymentConfig, RedisSettings, ServerSettings};
pub use infrastructure::health::{HealthServer, HealthServerError, HealthServerState};
pub use infrastructure::metrics::init_metrics;
pub use infrastructure::telemetry::{init as init_telemetry, telemetry_config};
