//! Prometheus Metrics Module
//!
//! Counters for the payment evaluator, rendered at `/metrics` on the
//! health server port.
//!
//! # Metrics
//!
//! - `payment_service_requests_total{outcome}`: payment requests consumed
//! - `payment_service_decisions_total{status}`: decisions taken

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{BuildError, PrometheusHandle};
use payment_messaging::PaymentStatus;

// =============================================================================
// Recorder
// =============================================================================

/// Install the Prometheus recorder with this service's counters described.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    service_runtime::metrics::install(register_metrics)
}

fn register_metrics() {
    describe_counter!(
        "payment_service_requests_total",
        "Payment requests consumed, by processing outcome"
    );
    describe_counter!(
        "payment_service_decisions_total",
        "Payment decisions taken, by status"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Processing outcome label for a consumed payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Result published to at least one subscriber.
    Published,
    /// Result published but nobody was subscribed.
    Undelivered,
    /// Payload failed the schema check.
    Malformed,
    /// Bus rejected the result.
    PublishFailed,
}

impl RequestOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Undelivered => "undelivered",
            Self::Malformed => "malformed",
            Self::PublishFailed => "publish_failed",
        }
    }
}

/// Record one consumed payment request.
pub fn record_request(outcome: RequestOutcome) {
    counter!(
        "payment_service_requests_total",
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Record a payment decision.
pub fn record_decision(status: PaymentStatus) {
    counter!(
        "payment_service_decisions_total",
        "status" => status.as_str()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_outcome_as_str() {
        assert_eq!(RequestOutcome::Published.as_str(), "published");
        assert_eq!(RequestOutcome::Undelivered.as_str(), "undelivered");
        assert_eq!(RequestOutcome::Malformed.as_str(), "malformed");
        assert_eq!(RequestOutcome::PublishFailed.as_str(), "publish_failed");
    }

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        record_request(RequestOutcome::Published);
        record_decision(PaymentStatus::Failure);
    }
}
