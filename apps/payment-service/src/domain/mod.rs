//! Payment domain.
//!
//! The decision rule is pure: no I/O, no state across messages.

mod payment_policy;

pub use payment_policy::{DEFAULT_FAILURE_THRESHOLD, PaymentPolicy};
