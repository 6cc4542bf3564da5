//! Payment Service Binary
//!
//! Starts the payment evaluator and its health server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin payment-service
//! ```
//!
//! # Environment Variables
//!
//! - `REDIS_URL`: Full Redis URL (overrides host/port)
//! - `REDIS_HOST`: Redis host (default: redis)
//! - `REDIS_PORT`: Redis port (default: 6379)
//! - `PAYMENT_SERVICE_PORT`: Health/metrics HTTP port (default: 8081)
//! - `PAYMENT_FAILURE_THRESHOLD`: Amounts above this are declined (default: 1000)
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use payment_messaging::{
    MessageBus, PAYMENT_REQUESTS, RedisMessageBus, ResubscribePolicy, SubscriptionHealth,
    resubscribing,
};
use payment_service::{
    EvaluatorStats, HealthServer, HealthServerState, PaymentConfig, PaymentEvaluator,
    PaymentPolicy, init_metrics, init_telemetry,
};
use service_runtime::{load_dotenv, shutdown_signal};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = load_dotenv();

    let _telemetry_guard = init_telemetry()?;

    tracing::info!(dotenv = ?dotenv, "Starting payment service");

    let _metrics_handle = init_metrics().context("failed to install Prometheus recorder")?;

    let config = PaymentConfig::from_env()?;
    log_config(&config);

    let bus = Arc::new(
        RedisMessageBus::connect(config.redis.url())
            .await
            .context("failed to connect to the message bus")?,
    );
    let first = bus
        .subscribe(PAYMENT_REQUESTS)
        .await
        .context("failed to subscribe to payment requests")?;
    let listener_health = SubscriptionHealth::new();
    let requests = resubscribing(
        Arc::clone(&bus),
        PAYMENT_REQUESTS,
        first,
        listener_health.clone(),
        ResubscribePolicy::default(),
    );

    let shutdown_token = CancellationToken::new();

    let health_state = Arc::new(HealthServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        Arc::clone(&bus) as Arc<dyn MessageBus>,
        listener_health,
    ));
    let health_server = HealthServer::new(
        config.server.port,
        health_state,
        shutdown_token.clone(),
    );
    let listener = health_server.bind().await?;

    let evaluator = PaymentEvaluator::new(
        Arc::clone(&bus),
        PaymentPolicy::new(config.failure_threshold),
    );
    let evaluator_cancel = shutdown_token.clone();
    let mut evaluator_task =
        tokio::spawn(async move { evaluator.run(requests, evaluator_cancel).await });

    let health_task = tokio::spawn(async move {
        if let Err(e) = health_server.serve(listener).await {
            tracing::error!(error = %e, "Health server error");
        }
    });

    tracing::info!("Payment service ready");

    // The evaluator only returns on cancellation; any earlier exit is fatal.
    let early_exit = tokio::select! {
        signal = shutdown_signal() => {
            match signal {
                Ok(signal) => tracing::info!(%signal, "Received shutdown signal"),
                Err(e) => tracing::error!(error = %e, "Signal handler failed, shutting down"),
            }
            None
        }
        joined = &mut evaluator_task => Some(joined),
    };

    shutdown_token.cancel();
    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );

    let drained = tokio::time::timeout(SHUTDOWN_TIMEOUT, async {
        if early_exit.is_none() {
            let _ = evaluator_task.await;
        }
        let _ = health_task.await;
    })
    .await;
    if drained.is_err() {
        tracing::warn!("Shutdown timed out, abandoning in-flight work");
    }

    if let Some(joined) = early_exit {
        return Err(listener_failure(joined));
    }

    tracing::info!("Payment service stopped");
    Ok(())
}

/// Describe an evaluator that stopped before shutdown was requested.
fn listener_failure(joined: Result<EvaluatorStats, JoinError>) -> anyhow::Error {
    match joined {
        Ok(stats) => {
            tracing::error!(received = stats.received, "Payment evaluator stopped unexpectedly");
            anyhow::anyhow!("payment evaluator stopped unexpectedly")
        }
        Err(e) => {
            tracing::error!(error = %e, "Payment evaluator task failed");
            anyhow::Error::new(e).context("payment evaluator task failed")
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &PaymentConfig) {
    tracing::info!(
        port = config.server.port,
        failure_threshold = %config.failure_threshold,
        "Configuration loaded"
    );
    tracing::debug!(redis = ?config.redis, "Message bus endpoint");
}
