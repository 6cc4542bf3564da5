//! In-memory stores for testing and local runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::domain::{
    NewOrder, NewProduct, Order, OrderId, OrderStateMachine, OrderStatus, OrderStore, Product,
    ProductStore, StoreError,
};

/// In-memory implementation of [`OrderStore`].
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let order = Order::pending(OrderId::generate(), order, Utc::now());
        self.orders.write().insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().get(id).cloned())
    }

    async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<u64, StoreError> {
        let mut orders = self.orders.write();
        let Some(order) = orders.get_mut(id) else {
            return Ok(0);
        };

        if let Err(e) = OrderStateMachine::validate_transition(order.status, status) {
            tracing::debug!(order_id = %id, reason = %e, "Overwriting order status");
        }
        order.status = status;
        order.updated_at = Utc::now();
        Ok(1)
    }
}

/// In-memory implementation of [`ProductStore`].
#[derive(Debug)]
pub struct InMemoryProductStore {
    next_id: AtomicI64,
    products: RwLock<HashMap<i64, Product>>,
}

impl InMemoryProductStore {
    /// Create a new empty store. IDs start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            products: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let product = product.into_product(id);
        self.products.write().insert(id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().get(&id).cloned())
    }
}
