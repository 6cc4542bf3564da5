//! Order Store Port
//!
//! Implemented by the Postgres and in-memory adapters in the
//! infrastructure layer.

use async_trait::async_trait;

use super::entity::{NewOrder, Order};
use super::id::OrderId;
use super::status::OrderStatus;
use crate::domain::shared::StoreError;

/// Persistence port for orders.
///
/// Every mutation is a single atomic statement; callers never read a row
/// and write it back.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new `pending` order and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Find an order by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails or the row is unreadable.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Overwrite an order's status and refresh its update timestamp.
    ///
    /// Returns the number of rows changed: zero when no order has `id`.
    ///
    /// # Errors
    ///
    /// Returns error if the update fails.
    async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<u64, StoreError>;
}
