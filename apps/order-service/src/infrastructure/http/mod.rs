//! HTTP/REST API adapter.
//!
//! Inbound adapter exposing order and product endpoints over axum.

mod controller;
mod error;
mod request;
mod response;

pub use controller::{AppState, create_router};
pub use error::ApiError;
pub use request::{CreateOrderRequest, CreateProductRequest};
pub use response::{ErrorResponse, HealthResponse, OrderResponse, ProductResponse};
