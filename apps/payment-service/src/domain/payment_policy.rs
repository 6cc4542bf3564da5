//! Payment decision policy.

use payment_messaging::PaymentStatus;
use rust_decimal::Decimal;

/// Amount above which payments are declined.
pub const DEFAULT_FAILURE_THRESHOLD: Decimal = Decimal::ONE_THOUSAND;

/// Deterministic payment decision rule.
///
/// The threshold is exclusive: an amount equal to it succeeds, anything
/// strictly greater fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentPolicy {
    threshold: Decimal,
}

impl PaymentPolicy {
    /// Create a policy with a custom failure threshold.
    #[must_use]
    pub const fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }

    /// Configured failure threshold.
    #[must_use]
    pub const fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Decide the outcome for an amount.
    #[must_use]
    pub fn decide(&self, amount: Decimal) -> PaymentStatus {
        if amount > self.threshold {
            PaymentStatus::Failure
        } else {
            PaymentStatus::Success
        }
    }
}

impl Default for PaymentPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD)
    }
}
