//! Product catalogue service.

use std::sync::Arc;

use crate::domain::{NewProduct, Product, ProductStore, StoreError};

/// Thin service over the product store.
pub struct ProductService<P>
where
    P: ProductStore,
{
    store: Arc<P>,
}

impl<P> ProductService<P>
where
    P: ProductStore,
{
    /// Create a new product service.
    pub const fn new(store: Arc<P>) -> Self {
        Self { store }
    }

    /// Store a new product.
    pub async fn create(&self, input: NewProduct) -> Result<Product, StoreError> {
        let product = self.store.insert(input).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to insert product");
        })?;
        tracing::info!(product_id = product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Look up a product.
    pub async fn get(&self, id: i64) -> Result<Option<Product>, StoreError> {
        self.store.find_by_id(id).await.inspect_err(|e| {
            tracing::error!(product_id = id, error = %e, "Failed to read product");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::infrastructure::persistence::InMemoryProductStore;

    #[tokio::test]
    async fn create_then_get() {
        let service = ProductService::new(Arc::new(InMemoryProductStore::new()));

        let created = service
            .create(NewProduct::new("Widget", dec!(19.99)).unwrap())
            .await
            .unwrap();
        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn get_unknown_is_none() {
        let service = ProductService::new(Arc::new(InMemoryProductStore::new()));
        assert_eq!(service.get(99).await.unwrap(), None);
    }
}
