//! Postgres Stores
//!
//! Runtime-checked `sqlx` queries over a shared `PgPool`. The pool is used
//! by both the HTTP handlers and the reconciler, so every mutation is one
//! statement.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::{
    NewOrder, NewProduct, Order, OrderId, OrderStatus, OrderStore, Product, ProductStore,
    StoreError,
};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const INSERT_ORDER: &str = "INSERT INTO orders (id, customer_id, product_id, status, amount, created_at, updated_at) \
     VALUES ($1, $2, $3, 'pending', $4, NOW(), NOW()) \
     RETURNING id, customer_id, product_id, status, amount, created_at, updated_at";

const SELECT_ORDER: &str = "SELECT id, customer_id, product_id, status, amount, created_at, updated_at \
     FROM orders WHERE id = $1";

const UPDATE_ORDER_STATUS: &str = "UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2";

const INSERT_PRODUCT: &str = "INSERT INTO products (name, price) VALUES ($1, $2) RETURNING id, name, price";

const SELECT_PRODUCT: &str = "SELECT id, name, price FROM products WHERE id = $1";

/// Build the connection pool and apply pending migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .map_err(database_error)?;

    MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| StoreError::database(format!("migration failed: {e}")))?;

    tracing::info!(max_connections, "Database pool ready");
    Ok(pool)
}

fn database_error(e: sqlx::Error) -> StoreError {
    StoreError::database(e.to_string())
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    customer_id: String,
    product_id: String,
    status: String,
    amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| StoreError::corrupt(format!("order {}: {e}", row.id)))?;

        Ok(Self {
            id: OrderId::from(row.id),
            customer_id: row.customer_id,
            product_id: row.product_id,
            status,
            amount: row.amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: Decimal,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
        }
    }
}

// =============================================================================
// Order Store
// =============================================================================

/// Postgres implementation of [`OrderStore`].
#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(INSERT_ORDER)
            .bind(OrderId::generate().as_uuid())
            .bind(order.customer_id())
            .bind(order.product_id())
            .bind(order.amount())
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?;

        Order::try_from(row)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        sqlx::query_as::<_, OrderRow>(SELECT_ORDER)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(Order::try_from)
            .transpose()
    }

    async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<u64, StoreError> {
        let result = sqlx::query(UPDATE_ORDER_STATUS)
            .bind(status.as_str())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Product Store
// =============================================================================

/// Postgres implementation of [`ProductStore`].
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        sqlx::query_as::<_, ProductRow>(INSERT_PRODUCT)
            .bind(product.name())
            .bind(product.price())
            .fetch_one(&self.pool)
            .await
            .map(Product::from)
            .map_err(database_error)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        sqlx::query_as::<_, ProductRow>(SELECT_PRODUCT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Product::from))
            .map_err(database_error)
    }
}
