//! HTTP response DTOs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Order, OrderId, OrderStatus, Product};

/// An order as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    /// Order ID.
    pub id: OrderId,
    /// Customer reference.
    pub customer_id: String,
    /// Product reference.
    pub product_id: String,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Order amount, as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            customer_id: order.customer_id,
            product_id: order.product_id,
            status: order.status,
            amount: order.amount,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// A product as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResponse {
    /// Product ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unit price, as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Whether the payment result listener is subscribed, when one runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener_subscribed: Option<bool>,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}
