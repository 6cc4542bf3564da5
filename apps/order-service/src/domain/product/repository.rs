//! Product Store Port

use async_trait::async_trait;

use super::entity::{NewProduct, Product};
use crate::domain::shared::StoreError;

/// Persistence port for products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a product and return it with its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Find a product by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError>;
}
