//! Prometheus Metrics Module
//!
//! Counters for the order service, rendered at `/metrics` on the API port.
//!
//! # Metrics
//!
//! - `order_service_orders_created_total`: orders written
//! - `order_service_payment_requests_total{outcome}`: payment request publishes
//! - `order_service_payment_results_total{outcome}`: payment results consumed

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{BuildError, PrometheusHandle};

// =============================================================================
// Recorder
// =============================================================================

/// Install the Prometheus recorder with this service's counters described.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    service_runtime::metrics::install(register_metrics)
}

fn register_metrics() {
    describe_counter!("order_service_orders_created_total", "Orders written");
    describe_counter!(
        "order_service_payment_requests_total",
        "Payment request publishes, by outcome"
    );
    describe_counter!(
        "order_service_payment_results_total",
        "Payment results consumed, by reconciliation outcome"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Outcome label for a payment request publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// At least one subscriber received it.
    Delivered,
    /// Accepted by the bus but nobody was subscribed.
    Undelivered,
    /// Bus rejected the publish.
    Failed,
}

impl PublishOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Undelivered => "undelivered",
            Self::Failed => "failed",
        }
    }
}

/// Outcome label for a consumed payment result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOutcome {
    /// Order status updated.
    Applied,
    /// No order with that ID.
    Unmatched,
    /// Payload failed the schema check.
    Malformed,
    /// Store rejected the update.
    StoreFailed,
}

impl ResultOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Unmatched => "unmatched",
            Self::Malformed => "malformed",
            Self::StoreFailed => "store_failed",
        }
    }
}

/// Record a written order.
pub fn record_order_created() {
    counter!("order_service_orders_created_total").increment(1);
}

/// Record a payment request publish.
pub fn record_payment_request(outcome: PublishOutcome) {
    counter!(
        "order_service_payment_requests_total",
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Record a consumed payment result.
pub fn record_payment_result(outcome: ResultOutcome) {
    counter!(
        "order_service_payment_results_total",
        "outcome" => outcome.as_str()
    )
    .increment(1);
}
