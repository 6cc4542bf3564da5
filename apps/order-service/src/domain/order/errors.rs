//! Order errors.

use std::fmt;

use super::status::OrderStatus;

/// Errors raised by order value objects and the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Text is not a valid order ID.
    InvalidId {
        /// Raw input.
        value: String,
    },

    /// Text is not a known order status.
    UnknownStatus {
        /// Raw input.
        value: String,
    },

    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Reason for failure.
        reason: String,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId { value } => write!(f, "Invalid order ID: '{value}'"),
            Self::UnknownStatus { value } => write!(f, "Unknown order status: '{value}'"),
            Self::InvalidStateTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid order state transition: {from} -> {to}: {reason}"
                )
            }
        }
    }
}

impl std::error::Error for OrderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_transition_display() {
        let err = OrderError::InvalidStateTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Failed,
            reason: "Order is already completed".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("completed -> failed"));
        assert!(msg.contains("already completed"));
    }

    #[test]
    fn invalid_id_display() {
        let err = OrderError::InvalidId {
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid order ID: 'abc'");
    }

    #[test]
    fn order_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(OrderError::UnknownStatus {
            value: "shipped".to_string(),
        });
        assert!(err.to_string().contains("shipped"));
    }
}
