//! Health Check and Metrics Endpoint
//!
//! The payment service has no business HTTP surface; this server exists for
//! orchestrators and monitoring.
//!
//! # Endpoints
//!
//! - `GET /health` - JSON health status: bus reachability and whether the
//!   request listener is subscribed
//! - `GET /healthz` - liveness probe (simple OK)
//! - `GET /readyz` - readiness probe (bus ping and listener subscription)
//! - `GET /metrics` - Prometheus metrics in text format

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use payment_messaging::{MessageBus, SubscriptionHealth};
use serde::Serialize;
use service_runtime::metrics::metrics_handler;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Service version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Whether the message bus answered a ping.
    pub bus_connected: bool,
    /// Whether the payment request listener holds a live subscription.
    pub listener_subscribed: bool,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational.
    Healthy,
    /// Message bus unreachable or listener not subscribed.
    Unhealthy,
}

// =============================================================================
// Health Server State
// =============================================================================

/// Shared state for the health server.
pub struct HealthServerState {
    version: String,
    started_at: Instant,
    bus: Arc<dyn MessageBus>,
    listener: SubscriptionHealth,
}

impl HealthServerState {
    /// Create new health server state.
    ///
    /// `listener` is the subscription flag of the payment request consumer.
    #[must_use]
    pub fn new(version: String, bus: Arc<dyn MessageBus>, listener: SubscriptionHealth) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            bus,
            listener,
        }
    }
}

// =============================================================================
// Health Server
// =============================================================================

/// Health check HTTP server.
pub struct HealthServer {
    port: u16,
    state: Arc<HealthServerState>,
    cancel: CancellationToken,
}

impl HealthServer {
    /// Create a new health server.
    #[must_use]
    pub const fn new(port: u16, state: Arc<HealthServerState>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Bind the port. Failing here is a startup error.
    pub async fn bind(&self) -> Result<TcpListener, HealthServerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        TcpListener::bind(addr)
            .await
            .map_err(|e| HealthServerError::BindFailed(self.port, e.to_string()))
    }

    /// Serve on an already bound listener until cancelled.
    pub async fn serve(self, listener: TcpListener) -> Result<(), HealthServerError> {
        tracing::info!(port = self.port, "Health server listening");

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| HealthServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Health server stopped");
        Ok(())
    }
}

/// Build the health router.
pub fn router(state: Arc<HealthServerState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn health_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    let response = build_health_response(&state).await;
    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    if let Err(e) = state.bus.ping().await {
        tracing::warn!(error = %e, "Readiness check failed");
        return (StatusCode::SERVICE_UNAVAILABLE, "NOT READY");
    }
    if !state.listener.is_subscribed() {
        tracing::warn!("Readiness check failed: payment request listener not subscribed");
        return (StatusCode::SERVICE_UNAVAILABLE, "NOT READY");
    }
    (StatusCode::OK, "READY")
}

async fn build_health_response(state: &HealthServerState) -> HealthResponse {
    let bus_connected = state.bus.ping().await.is_ok();
    let listener_subscribed = state.listener.is_subscribed();

    HealthResponse {
        status: if bus_connected && listener_subscribed {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        },
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        bus_connected,
        listener_subscribed,
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Health server errors.
#[derive(Debug, thiserror::Error)]
pub enum HealthServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================
