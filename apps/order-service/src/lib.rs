#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Order Service - Orders, Products and Payment Reconciliation
//!
//! Stores orders and products behind a REST API, publishes a payment
//! request for every new order and applies payment results back onto the
//! stored order.
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: `Order`, `OrderStatus`, `Product`, store ports
//! - **Application**: `CreateOrderUseCase`, `PaymentResultReconciler`, `ProductService`
//! - **Infrastructure**: HTTP, Postgres and in-memory stores, configuration, metrics, telemetry
//!
//! # Data Flow
//!
//! ```text
//! POST /order ──► CreateOrderUseCase ──► OrderStore (pending)
//!                        │
//!                        └──► payment_requests
//!
//! payment_results ──► PaymentResultReconciler ──► OrderStore (completed | failed)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - orders, products and their store ports.
pub mod domain;

/// Application layer - use cases and services.
pub mod application;

/// Infrastructure layer - adapters and process plumbing.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::services::{
    PaymentResultReconciler, ProductService, ReconcileOutcome, ReconcilerStats,
};
pub use application::use_cases::CreateOrderUseCase;
pub use domain::{
    NewOrder, NewProduct, Order, OrderId, OrderStatus, Product, StoreError, ValidationError,
};
pub use infrastructure::config::{
    ConfigError, DatabaseSettings, OrderConfig, RedisSettings, ServerSettings,
};
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::metrics::init_metrics;
pub use infrastructure::persistence::{
    InMemoryOrderStore, InMemoryProductStore, PostgresOrderStore, PostgresProductStore,
};
pub use infrastructure::telemetry::{init as init_telemetry, telemetry_config};
