//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to the application layer.
//!
//! # Endpoints
//!
//! - `POST /order` - create an order and start its payment
//! - `GET /order/{id}` - read an order
//! - `POST /product` - create a product
//! - `GET /product/{id}` - read a product
//! - `GET /health` - service status; 503 while the payment result listener
//!   is not subscribed
//! - `GET /metrics` - Prometheus metrics in text format

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use payment_messaging::{MessageBus, SubscriptionHealth};
use service_runtime::metrics::metrics_handler;

use crate::application::services::ProductService;
use crate::application::use_cases::CreateOrderUseCase;
use crate::domain::{OrderId, OrderStore, ProductStore};

use super::error::ApiError;
use super::request::{CreateOrderRequest, CreateProductRequest};
use super::response::{HealthResponse, OrderResponse, ProductResponse};

/// Application state shared across handlers.
pub struct AppState<S, P, B>
where
    S: OrderStore,
    P: ProductStore,
    B: MessageBus,
{
    /// Use case for creating orders.
    pub create_order: Arc<CreateOrderUseCase<S, B>>,
    /// Order store for queries.
    pub orders: Arc<S>,
    /// Product catalogue.
    pub products: Arc<ProductService<P>>,
    /// Application version.
    pub version: String,
    /// Subscription flag of the payment result listener, when one runs.
    pub listener: Option<SubscriptionHealth>,
}

impl<S, P, B> AppState<S, P, B>
where
    S: OrderStore,
    P: ProductStore,
    B: MessageBus + 'static,
{
    /// Wire the application services over the given adapters.
    pub fn new(orders: Arc<S>, products: Arc<P>, bus: Arc<B>, version: impl Into<String>) -> Self {
        Self {
            create_order: Arc::new(CreateOrderUseCase::new(Arc::clone(&orders), bus)),
            orders,
            products: Arc::new(ProductService::new(products)),
            version: version.into(),
            listener: None,
        }
    }

    /// Report the payment result listener's subscription on `/health`.
    #[must_use]
    pub fn with_listener(mut self, listener: SubscriptionHealth) -> Self {
        self.listener = Some(listener);
        self
    }
}

impl<S, P, B> Clone for AppState<S, P, B>
where
    S: OrderStore,
    P: ProductStore,
    B: MessageBus,
{
    fn clone(&self) -> Self {
        Self {
            create_order: Arc::clone(&self.create_order),
            orders: Arc::clone(&self.orders),
            products: Arc::clone(&self.products),
            version: self.version.clone(),
            listener: self.listener.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<S, P, B>(state: AppState<S, P, B>) -> Router
where
    S: OrderStore + 'static,
    P: ProductStore + 'static,
    B: MessageBus + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/order", post(create_order))
        .route("/order/{id}", get(get_order))
        .route("/product", post(create_product))
        .route("/product/{id}", get(get_product))
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

async fn health_check<S, P, B>(State(state): State<AppState<S, P, B>>) -> impl IntoResponse
where
    S: OrderStore,
    P: ProductStore,
    B: MessageBus,
{
    let listener_subscribed = state.listener.as_ref().map(SubscriptionHealth::is_subscribed);
    let (code, status) = if listener_subscribed == Some(false) {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    } else {
        (StatusCode::OK, "healthy")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: state.version.clone(),
            listener_subscribed,
        }),
    )
}

async fn create_order<S, P, B>(
    State(state): State<AppState<S, P, B>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    S: OrderStore,
    P: ProductStore,
    B: MessageBus + 'static,
{
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected order payload");
        ApiError::bad_request("Invalid request payload")
    })?;
    let input = request
        .into_new_order()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let order = state
        .create_order
        .execute(input)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create order: {e}")))?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

async fn get_order<S, P, B>(
    State(state): State<AppState<S, P, B>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore,
    P: ProductStore,
    B: MessageBus,
{
    let order_id = OrderId::parse(&id).map_err(|_| ApiError::bad_request("Invalid order ID"))?;

    match state.orders.find_by_id(&order_id).await {
        Ok(Some(order)) => Ok(Json(OrderResponse::from(order))),
        Ok(None) => Err(ApiError::not_found("Order not found")),
        Err(e) => {
            tracing::error!(order_id = %order_id, error = %e, "Failed to read order");
            Err(ApiError::internal("Failed to retrieve order"))
        }
    }
}

async fn create_product<S, P, B>(
    State(state): State<AppState<S, P, B>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError>
where
    S: OrderStore,
    P: ProductStore,
    B: MessageBus,
{
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected product payload");
        ApiError::bad_request("Invalid request payload")
    })?;
    let input = request
        .into_new_product()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let product = state
        .products
        .create(input)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create product: {e}")))?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

async fn get_product<S, P, B>(
    State(state): State<AppState<S, P, B>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError>
where
    S: OrderStore,
    P: ProductStore,
    B: MessageBus,
{
    let product_id: i64 = id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid product ID"))?;

    match state.products.get(product_id).await {
        Ok(Some(product)) => Ok(Json(ProductResponse::from(product))),
        Ok(None) => Err(ApiError::not_found("Product not found")),
        Err(_) => Err(ApiError::internal("Failed to retrieve product")),
    }
}

// =============================================================================
// Tests
// =============================================================================
