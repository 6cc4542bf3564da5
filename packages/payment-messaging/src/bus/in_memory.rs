//! In-process message bus built on tokio broadcast channels.
//!
//! Mirrors the Redis semantics the services rely on: fan-out to every
//! live subscriber, nothing retained for late subscribers, and a publish
//! with no subscribers silently drops the payload.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use super::{BusError, MessageBus, MessageStream};

/// Default per-channel buffer before slow subscribers start lagging.
const DEFAULT_CAPACITY: usize = 1_024;

/// In-memory implementation of [`MessageBus`].
#[derive(Debug)]
pub struct InMemoryMessageBus {
    capacity: usize,
    channels: RwLock<HashMap<String, broadcast::Sender<String>>>,
}

impl InMemoryMessageBus {
    /// Create a bus with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus whose channels buffer `capacity` payloads per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live subscribers on a channel.
    #[must_use]
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .get(channel)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Drop a channel, ending every open subscription stream on it.
    pub fn close_channel(&self, channel: &str) {
        self.channels.write().remove(channel);
    }

    fn sender(&self, channel: &str) -> broadcast::Sender<String> {
        if let Some(tx) = self.channels.read().get(channel) {
            return tx.clone();
        }
        self.channels
            .write()
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for InMemoryMessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for InMemoryMessageBus {
    async fn publish(&self, channel: &str, payload: String) -> Result<usize, BusError> {
        let tx = self.channels.read().get(channel).cloned();
        // send only fails when nobody is listening
        Ok(tx.and_then(|tx| tx.send(payload).ok()).unwrap_or(0))
    }

    async fn subscribe(&self, channel: &str) -> Result<MessageStream, BusError> {
        let rx = self.sender(channel).subscribe();
        let channel = channel.to_string();

        let stream = BroadcastStream::new(rx).filter_map(move |item| {
            let payload = match item {
                Ok(payload) => Some(payload),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(channel = %channel, skipped, "Subscriber lagged, messages lost");
                    None
                }
            };
            std::future::ready(payload)
        });

        Ok(Box::pin(stream))
    }

    async fn ping(&self) -> Result<(), BusError> {
        Ok(())
    }
}
