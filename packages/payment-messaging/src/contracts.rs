//! Message Contracts
//!
//! Schema-checked payloads carried on the two payment channels. Every
//! payload is decoded exactly once at the bus boundary; anything that does
//! not match the schema is rejected with [`ContractError::Malformed`].
//!
//! # Channels
//!
//! | Channel | Producer | Consumer | Payload |
//! |---------|----------|----------|---------|
//! | `payment_requests` | order-service | payment-service | [`PaymentRequest`] |
//! | `payment_results` | payment-service | order-service | [`PaymentResult`] |

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Channel carrying one [`PaymentRequest`] per created order.
pub const PAYMENT_REQUESTS: &str = "payment_requests";

/// Channel carrying one [`PaymentResult`] per evaluated request.
pub const PAYMENT_RESULTS: &str = "payment_results";

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while encoding or decoding a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// Payload did not match the channel schema.
    #[error("malformed message on {channel}: {reason}")]
    Malformed {
        /// Channel the payload arrived on.
        channel: &'static str,
        /// Decoder diagnostic.
        reason: String,
    },

    /// Message could not be serialized.
    #[error("failed to encode message for {channel}: {reason}")]
    Encode {
        /// Channel the message was destined for.
        channel: &'static str,
        /// Encoder diagnostic.
        reason: String,
    },
}

// =============================================================================
// Payment Status
// =============================================================================

/// Outcome of a payment evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Payment accepted.
    Success,
    /// Payment declined.
    Failure,
}

impl PaymentStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Request
// =============================================================================

/// Request to evaluate payment for a freshly created order.
///
/// Correlated with its [`PaymentResult`] solely by `order_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Order being paid for.
    pub order_id: Uuid,
    /// Amount to charge. Encoded as a JSON number.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    /// Customer reference.
    pub customer_id: String,
    /// Product reference.
    pub product_id: String,
    /// Order creation time at emission.
    pub created_at: DateTime<Utc>,
    /// Order update time at emission.
    pub updated_at: DateTime<Utc>,
}

impl PaymentRequest {
    /// Decode a `payment_requests` payload.
    pub fn decode(payload: &str) -> Result<Self, ContractError> {
        serde_json::from_str(payload).map_err(|e| ContractError::Malformed {
            channel: PAYMENT_REQUESTS,
            reason: e.to_string(),
        })
    }

    /// Encode for the `payment_requests` channel.
    pub fn encode(&self) -> Result<String, ContractError> {
        serde_json::to_string(self).map_err(|e| ContractError::Encode {
            channel: PAYMENT_REQUESTS,
            reason: e.to_string(),
        })
    }
}

// =============================================================================
// Payment Result
// =============================================================================

/// Decision emitted by the payment service for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResult {
    /// Order the decision applies to.
    pub order_id: Uuid,
    /// Decision.
    pub status: PaymentStatus,
}

impl PaymentResult {
    /// Create a result for an order.
    #[must_use]
    pub const fn new(order_id: Uuid, status: PaymentStatus) -> Self {
        Self { order_id, status }
    }

    /// Decode a `payment_results` payload.
    pub fn decode(payload: &str) -> Result<Self, ContractError> {
        serde_json::from_str(payload).map_err(|e| ContractError::Malformed {
            channel: PAYMENT_RESULTS,
            reason: e.to_string(),
        })
    }

    /// Encode for the `payment_results` channel.
    pub fn encode(&self) -> Result<String, ContractError> {
        serde_json::to_string(self).map_err(|e| ContractError::Encode {
            channel: PAYMENT_RESULTS,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tokio_test::assert_err;

    fn sample_request() -> PaymentRequest {
        let now = Utc::now();
        PaymentRequest {
            order_id: Uuid::new_v4(),
            amount: dec!(250),
            customer_id: "c1".to_string(),
            product_id: "p1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn payment_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Failure).unwrap(),
            "\"failure\""
        );
        assert_eq!(PaymentStatus::Failure.to_string(), "failure");
    }

    #[test]
    fn request_amount_is_a_json_number() {
        let encoded = sample_request().encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert!(value["amount"].is_number());
        assert_eq!(value["customer_id"], "c1");
    }

    #[test]
    fn request_decodes_integer_float_and_string_amounts() {
        let id = Uuid::new_v4();
        for (raw, expected) in [
            ("1000", dec!(1000)),
            ("1000.01", dec!(1000.01)),
            ("\"12.50\"", dec!(12.50)),
        ] {
            let payload = format!(
                r#"{{"order_id":"{id}","amount":{raw},"customer_id":"c","product_id":"p",
                "created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}}"#
            );
            let request = PaymentRequest::decode(&payload).unwrap();
            assert_eq!(request.amount, expected);
            assert_eq!(request.order_id, id);
        }
    }

    #[test]
    fn request_missing_field_is_malformed() {
        let payload = format!(r#"{{"order_id":"{}","amount":10}}"#, Uuid::new_v4());
        let err = PaymentRequest::decode(&payload).unwrap_err();
        assert!(matches!(
            err,
            ContractError::Malformed {
                channel: PAYMENT_REQUESTS,
                ..
            }
        ));
    }

    #[test]
    fn result_rejects_unknown_status() {
        let payload = format!(r#"{{"order_id":"{}","status":"maybe"}}"#, Uuid::new_v4());
        assert!(PaymentResult::decode(&payload).is_err());
    }

    #[test]
    fn result_rejects_non_uuid_order_id() {
        assert_err!(PaymentResult::decode(r#"{"order_id":42,"status":"success"}"#));
        assert_err!(PaymentResult::decode(r#"{"order_id":"abc","status":"success"}"#));
    }

    #[test]
    fn result_rejects_garbage() {
        let err = PaymentResult::decode("not json").unwrap_err();
        assert!(err.to_string().starts_with("malformed message on payment_results"));
    }

    #[test]
    fn result_decodes_reference_payload() {
        let id = Uuid::new_v4();
        let result =
            PaymentResult::decode(&format!(r#"{{"order_id":"{id}","status":"failure"}}"#))
                .unwrap();
        assert_eq!(result, PaymentResult::new(id, PaymentStatus::Failure));
    }
}
