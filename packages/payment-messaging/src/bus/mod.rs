//! Message Bus Port
//!
//! Named-channel publish/subscribe with no persistence, no acknowledgment
//! and no redelivery. A subscriber only sees payloads published while its
//! subscription is active.

mod in_memory;
mod redis_bus;
mod resubscribe;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::Serialize;

pub use self::in_memory::InMemoryMessageBus;
pub use self::redis_bus::RedisMessageBus;
pub use self::resubscribe::{ResubscribePolicy, SubscriptionHealth, resubscribing};

/// Lazily produced, non-restartable sequence of raw payloads.
pub type MessageStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Message bus error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BusError {
    /// Bus unreachable.
    #[error("message bus connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Publishing failed.
    #[error("publish to {channel} failed: {message}")]
    Publish {
        /// Target channel.
        channel: String,
        /// Error message.
        message: String,
    },

    /// Subscribing failed.
    #[error("subscribe to {channel} failed: {message}")]
    Subscribe {
        /// Target channel.
        channel: String,
        /// Error message.
        message: String,
    },
}

/// Port for a publish/subscribe message bus.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish a payload, returning how many subscribers received it.
    ///
    /// Zero receivers is not an error: the payload is simply gone.
    async fn publish(&self, channel: &str, payload: String) -> Result<usize, BusError>;

    /// Subscribe to a channel.
    ///
    /// The returned stream ends when the underlying connection closes;
    /// see [`resubscribing`] for listeners that must outlive it.
    async fn subscribe(&self, channel: &str) -> Result<MessageStream, BusError>;

    /// Check that the bus is reachable.
    async fn ping(&self) -> Result<(), BusError>;
}

/// Serialize `message` as JSON and publish it.
pub async fn publish_json<B, T>(bus: &B, channel: &str, message: &T) -> Result<usize, BusError>
where
    B: MessageBus + ?Sized,
    T: Serialize + Sync,
{
    let payload = serde_json::to_string(message).map_err(|e| BusError::Publish {
        channel: channel.to_string(),
        message: e.to_string(),
    })?;
    bus.publish(channel, payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn publish_json_serializes_payload() {
        let bus = InMemoryMessageBus::new();
        let mut stream = bus.subscribe("greetings").await.unwrap();

        let delivered = publish_json(&bus, "greetings", &serde_json::json!({"hello": "world"}))
            .await
            .unwrap();
        assert_eq!(delivered, 1);

        let payload = stream.next().await.unwrap();
        assert_eq!(payload, r#"{"hello":"world"}"#);
    }

    #[test]
    fn bus_error_display() {
        let err = BusError::Publish {
            channel: "payment_requests".to_string(),
            message: "broken pipe".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "publish to payment_requests failed: broken pipe"
        );
    }
}
