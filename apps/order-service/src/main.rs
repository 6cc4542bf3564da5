//! Order Service Binary
//!
//! Starts the REST API and the payment result reconciler.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-service
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: Full Postgres URL (overrides the `DB_*` variables)
//! - `DB_USER`, `DB_PASS`, `DB_NAME`: Postgres credentials (required without `DATABASE_URL`)
//! - `DB_HOST`: Postgres host (default: db)
//! - `DB_PORT`: Postgres port (default: 5432)
//! - `DB_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `REDIS_URL`: Full Redis URL (overrides host/port)
//! - `REDIS_HOST`: Redis host (default: redis)
//! - `REDIS_PORT`: Redis port (default: 6379)
//! - `ORDER_SERVICE_PORT`: REST API port (default: 8080)
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `RUST_LOG`: Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use order_service::infrastructure::persistence;
use order_service::{
    AppState, OrderConfig, PaymentResultReconciler, PostgresOrderStore, PostgresProductStore,
    ReconcilerStats, create_router, init_metrics, init_telemetry,
};
use payment_messaging::{
    MessageBus, PAYMENT_RESULTS, RedisMessageBus, ResubscribePolicy, SubscriptionHealth,
    resubscribing,
};
use service_runtime::{load_dotenv, shutdown_signal};
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = load_dotenv();

    let _telemetry_guard = init_telemetry()?;

    tracing::info!(dotenv = ?dotenv, "Starting order service");

    let _metrics_handle = init_metrics().context("failed to install Prometheus recorder")?;

    let config = OrderConfig::from_env()?;
    log_config(&config);

    let pool = persistence::connect(config.database.url(), config.database.max_connections)
        .await
        .context("failed to connect to the order store")?;
    let orders = Arc::new(PostgresOrderStore::new(pool.clone()));
    let products = Arc::new(PostgresProductStore::new(pool));

    let bus = Arc::new(
        RedisMessageBus::connect(config.redis.url())
            .await
            .context("failed to connect to the message bus")?,
    );
    let first = bus
        .subscribe(PAYMENT_RESULTS)
        .await
        .context("failed to subscribe to payment results")?;
    let listener_health = SubscriptionHealth::new();
    let results = resubscribing(
        Arc::clone(&bus),
        PAYMENT_RESULTS,
        first,
        listener_health.clone(),
        ResubscribePolicy::default(),
    );

    let shutdown_token = CancellationToken::new();

    let reconciler = PaymentResultReconciler::new(Arc::clone(&orders));
    let reconciler_cancel = shutdown_token.clone();
    let mut reconciler_task =
        tokio::spawn(async move { reconciler.run(results, reconciler_cancel).await });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to port {}", config.server.port))?;

    let state = AppState::new(orders, products, bus, env!("CARGO_PKG_VERSION"))
        .with_listener(listener_health);
    let http_cancel = shutdown_token.clone();
    let http_task = tokio::spawn(async move {
        tracing::info!(%addr, "HTTP server listening");
        if let Err(e) = axum::serve(listener, create_router(state))
            .with_graceful_shutdown(http_cancel.cancelled_owned())
            .await
        {
            tracing::error!(error = %e, "HTTP server error");
        }
    });

    tracing::info!("Order service ready");

    // The reconciler only returns on cancellation; any earlier exit is fatal.
    let early_exit = tokio::select! {
        signal = shutdown_signal() => {
            match signal {
                Ok(signal) => tracing::info!(%signal, "Received shutdown signal"),
                Err(e) => tracing::error!(error = %e, "Signal handler failed, shutting down"),
            }
            None
        }
        joined = &mut reconciler_task => Some(joined),
    };

    shutdown_token.cancel();
    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );

    let drained = tokio::time::timeout(SHUTDOWN_TIMEOUT, async {
        if early_exit.is_none()
            && let Ok(stats) = reconciler_task.await
        {
            log_stats(&stats);
        }
        let _ = http_task.await;
    })
    .await;
    if drained.is_err() {
        tracing::warn!("Shutdown timed out, abandoning in-flight work");
    }

    if let Some(joined) = early_exit {
        return Err(listener_failure(joined));
    }

    tracing::info!("Order service stopped");
    Ok(())
}

/// Describe a reconciler that stopped before shutdown was requested.
fn listener_failure(joined: Result<ReconcilerStats, JoinError>) -> anyhow::Error {
    match joined {
        Ok(stats) => {
            log_stats(&stats);
            tracing::error!("Payment result reconciler stopped unexpectedly");
            anyhow::anyhow!("payment result reconciler stopped unexpectedly")
        }
        Err(e) => {
            tracing::error!(error = %e, "Payment result reconciler task failed");
            anyhow::Error::new(e).context("payment result reconciler task failed")
        }
    }
}

fn log_stats(stats: &ReconcilerStats) {
    tracing::info!(
        received = stats.received,
        applied = stats.applied,
        unmatched = stats.unmatched,
        malformed = stats.malformed,
        store_failed = stats.store_failed,
        "Reconciler drained"
    );
}

/// Log the parsed configuration.
fn log_config(config: &OrderConfig) {
    tracing::info!(
        port = config.server.port,
        max_connections = config.database.max_connections,
        "Configuration loaded"
    );
    tracing::debug!(database = ?config.database, redis = ?config.redis, "Backing services");
}
