//! Order identifier.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;

/// Globally unique order identifier, assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the textual UUID form.
    pub fn parse(value: &str) -> Result<Self, OrderError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| OrderError::InvalidId {
                value: value.to_string(),
            })
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for OrderId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_unique() {
        assert_ne!(OrderId::generate(), OrderId::generate());
    }

    #[test]
    fn parse_round_trips_display() {
        let id = OrderId::generate();
        assert_eq!(OrderId::parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn parse_rejects_non_uuid() {
        assert_eq!(
            OrderId::parse("42"),
            Err(OrderError::InvalidId {
                value: "42".to_string()
            })
        );
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = OrderId::parse("7f1f6c1e-4a57-4d0a-9d43-0c8f0e6f8a10").unwrap();
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"7f1f6c1e-4a57-4d0a-9d43-0c8f0e6f8a10\""
        );
    }
}
