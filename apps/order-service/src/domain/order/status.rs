//! Order status in the lifecycle.

use std::fmt;
use std::str::FromStr;

use payment_messaging::PaymentStatus;
use serde::{Deserialize, Serialize};

use super::errors::OrderError;

/// Order status, stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Written, awaiting a payment decision.
    Pending,
    /// Payment succeeded.
    Completed,
    /// Payment was declined.
    Failed,
}

impl OrderStatus {
    /// Returns true if no further transition is allowed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Stored text form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Status an order takes after a payment decision.
    #[must_use]
    pub const fn from_payment(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Success => Self::Completed,
            PaymentStatus::Failure => Self::Failed,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(OrderError::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}
