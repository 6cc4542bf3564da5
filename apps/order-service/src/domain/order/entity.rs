//! Order record and its validated write input.

use chrono::{DateTime, Utc};
use payment_messaging::PaymentRequest;
use rust_decimal::Decimal;

use super::id::OrderId;
use super::status::OrderStatus;
use crate::domain::shared::{ValidationError, require_money, require_text};

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Identifier assigned at creation.
    pub id: OrderId,
    /// Customer reference.
    pub customer_id: String,
    /// Product reference.
    pub product_id: String,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Order amount.
    pub amount: Decimal,
    /// When the order was written.
    pub created_at: DateTime<Utc>,
    /// When the order was last written.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a fresh `pending` order from validated input.
    #[must_use]
    pub fn pending(id: OrderId, input: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id,
            customer_id: input.customer_id,
            product_id: input.product_id,
            status: OrderStatus::Pending,
            amount: input.amount,
            created_at: now,
            updated_at: now,
        }
    }

    /// The payment request announcing this order.
    #[must_use]
    pub fn to_payment_request(&self) -> PaymentRequest {
        PaymentRequest {
            order_id: self.id.as_uuid(),
            amount: self.amount,
            customer_id: self.customer_id.clone(),
            product_id: self.product_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Validated input for creating an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    customer_id: String,
    product_id: String,
    amount: Decimal,
}

impl NewOrder {
    /// Validate order-write fields.
    ///
    /// References are trimmed and must not be blank. The amount must be
    /// positive and fit the stored precision.
    pub fn new(
        customer_id: &str,
        product_id: &str,
        amount: Decimal,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            customer_id: require_text("customer_id", customer_id)?,
            product_id: require_text("product_id", product_id)?,
            amount: require_money("amount", amount)?,
        })
    }

    /// Customer reference.
    #[must_use]
    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// Product reference.
    #[must_use]
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Order amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }
}
