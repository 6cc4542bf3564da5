//! Redis pub/sub adapter.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::{BusError, MessageBus, MessageStream};

/// [`MessageBus`] backed by Redis `PUBLISH`/`SUBSCRIBE`.
///
/// Publishing goes through a shared, auto-reconnecting connection manager.
/// Every subscription opens its own pub/sub connection, as Redis requires.
#[derive(Clone)]
pub struct RedisMessageBus {
    client: redis::Client,
    publisher: ConnectionManager,
    timeout: Duration,
}

impl RedisMessageBus {
    /// Upper bound on connecting, subscribing and pinging.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Connect to Redis and verify it answers `PING`.
    ///
    /// Gives up after [`Self::CONNECT_TIMEOUT`].
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        Self::connect_with_timeout(url, Self::CONNECT_TIMEOUT).await
    }

    /// Connect with an explicit deadline.
    ///
    /// The connection manager retries refused connections with backoff on
    /// its own, so the deadline covers the whole handshake.
    pub async fn connect_with_timeout(url: &str, timeout: Duration) -> Result<Self, BusError> {
        let client = redis::Client::open(url).map_err(connection_error)?;

        let bus = within(timeout, "connecting to Redis", async {
            let publisher = ConnectionManager::new(client.clone())
                .await
                .map_err(connection_error)?;
            let bus = Self {
                client,
                publisher,
                timeout,
            };
            bus.send_ping().await?;
            Ok::<_, BusError>(bus)
        })
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Redis message bus unreachable"))?;

        tracing::info!("Connected to Redis message bus");
        Ok(bus)
    }

    async fn send_ping(&self) -> Result<(), BusError> {
        let mut conn = self.publisher.clone();
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(connection_error)?;
        Ok(())
    }
}

/// Run `operation`, turning an elapsed deadline into a connection error.
async fn within<T>(
    timeout: Duration,
    action: &str,
    operation: impl Future<Output = Result<T, BusError>>,
) -> Result<T, BusError> {
    tokio::time::timeout(timeout, operation)
        .await
        .unwrap_or_else(|_| {
            Err(BusError::Connection {
                message: format!("timed out after {}ms {action}", timeout.as_millis()),
            })
        })
}

impl std::fmt::Debug for RedisMessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisMessageBus").finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageBus for RedisMessageBus {
    async fn publish(&self, channel: &str, payload: String) -> Result<usize, BusError> {
        let mut conn = self.publisher.clone();
        conn.publish(channel, payload)
            .await
            .map_err(|e| BusError::Publish {
                channel: channel.to_string(),
                message: e.to_string(),
            })
    }

    async fn subscribe(&self, channel: &str) -> Result<MessageStream, BusError> {
        let subscribe_error = |e: redis::RedisError| BusError::Subscribe {
            channel: channel.to_string(),
            message: e.to_string(),
        };

        let open = async {
            let mut pubsub = self
                .client
                .get_async_pubsub()
                .await
                .map_err(subscribe_error)?;
            pubsub.subscribe(channel).await.map_err(subscribe_error)?;
            Ok::<_, BusError>(pubsub)
        };
        let pubsub = tokio::time::timeout(self.timeout, open)
            .await
            .map_err(|_| BusError::Subscribe {
                channel: channel.to_string(),
                message: format!("timed out after {}ms", self.timeout.as_millis()),
            })??;

        tracing::info!(channel, "Subscribed to Redis channel");

        let channel = channel.to_string();
        let stream = pubsub.into_on_message().filter_map(move |msg| {
            let payload = match msg.get_payload::<String>() {
                Ok(payload) => Some(payload),
                Err(e) => {
                    tracing::warn!(channel = %channel, error = %e, "Dropping non-text payload");
                    None
                }
            };
            std::future::ready(payload)
        });

        Ok(Box::pin(stream))
    }

    async fn ping(&self) -> Result<(), BusError> {
        within(self.timeout, "waiting for PONG", self.send_ping()).await
    }
}

fn connection_error(e: redis::RedisError) -> BusError {
    BusError::Connection {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    // port 1 is never a Redis server
    const UNREACHABLE: &str = "redis://127.0.0.1:1";

    #[tokio::test]
    async fn connect_rejects_invalid_url() {
        let result = RedisMessageBus::connect("not-a-redis-url").await;
        assert!(matches!(result, Err(BusError::Connection { .. })));
    }

    #[tokio::test]
    async fn connect_fails_fast_when_server_unreachable() {
        let started = Instant::now();
        let result = RedisMessageBus::connect_with_timeout(UNREACHABLE, Duration::from_secs(1)).await;

        assert!(matches!(result, Err(BusError::Connection { .. })));
        assert!(
            started.elapsed() < Duration::from_secs(3),
            "connect took {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn default_connect_gives_up_within_its_deadline() {
        let bounded = tokio::time::timeout(
            RedisMessageBus::CONNECT_TIMEOUT + Duration::from_secs(2),
            RedisMessageBus::connect(UNREACHABLE),
        )
        .await;

        let result = bounded.expect("connect kept retrying past its deadline");
        assert!(matches!(result, Err(BusError::Connection { .. })));
    }

    #[tokio::test]
    async fn deadline_becomes_connection_error() {
        let result: Result<(), BusError> =
            within(Duration::from_millis(10), "waiting", std::future::pending()).await;

        let Err(BusError::Connection { message }) = result else {
            panic!("expected a connection error");
        };
        assert_eq!(message, "timed out after 10ms waiting");
    }
}
