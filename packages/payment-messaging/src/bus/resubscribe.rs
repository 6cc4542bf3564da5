//! Self-healing subscriptions.
//!
//! A [`MessageStream`] ends when its connection drops. Long-running
//! listeners wrap it with [`resubscribing`], which subscribes again with
//! backoff and publishes its state through a [`SubscriptionHealth`] flag
//! for health endpoints. Payloads published while resubscribing are lost.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::StreamExt;

use super::{MessageBus, MessageStream};

/// Shared flag: is the listener currently subscribed?
#[derive(Debug, Clone, Default)]
pub struct SubscriptionHealth(Arc<AtomicBool>);

impl SubscriptionHealth {
    /// New flag, not yet subscribed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a subscription is currently live.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Record the subscription state.
    pub fn set_subscribed(&self, subscribed: bool) {
        self.0.store(subscribed, Ordering::Release);
    }
}

/// Backoff between resubscribe attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResubscribePolicy {
    /// Wait before the first attempt.
    pub initial_delay: Duration,
    /// Cap on the doubling delay.
    pub max_delay: Duration,
}

impl Default for ResubscribePolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl ResubscribePolicy {
    fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }
}

/// Wrap `first` so that the stream survives subscription loss.
///
/// The returned stream never ends on its own; stop it by dropping it.
pub fn resubscribing<B>(
    bus: Arc<B>,
    channel: impl Into<String>,
    first: MessageStream,
    health: SubscriptionHealth,
    policy: ResubscribePolicy,
) -> MessageStream
where
    B: MessageBus + ?Sized + 'static,
{
    health.set_subscribed(true);
    let listener = Listener {
        bus,
        channel: channel.into(),
        current: first,
        health,
        policy,
    };

    Box::pin(futures::stream::unfold(listener, |mut listener| async move {
        let payload = listener.next_payload().await;
        Some((payload, listener))
    }))
}

struct Listener<B: ?Sized> {
    bus: Arc<B>,
    channel: String,
    current: MessageStream,
    health: SubscriptionHealth,
    policy: ResubscribePolicy,
}

impl<B: MessageBus + ?Sized> Listener<B> {
    async fn next_payload(&mut self) -> String {
        loop {
            if let Some(payload) = self.current.next().await {
                return payload;
            }

            self.health.set_subscribed(false);
            tracing::warn!(channel = %self.channel, "Subscription ended, resubscribing");

            self.current =
                subscribe_with_backoff(self.bus.as_ref(), &self.channel, self.policy).await;

            self.health.set_subscribed(true);
            tracing::info!(channel = %self.channel, "Resubscribed");
        }
    }
}

async fn subscribe_with_backoff<B: MessageBus + ?Sized>(
    bus: &B,
    channel: &str,
    policy: ResubscribePolicy,
) -> MessageStream {
    let mut delay = policy.initial_delay;
    let mut attempt: u32 = 0;
    loop {
        tokio::time::sleep(delay).await;
        attempt = attempt.saturating_add(1);

        match bus.subscribe(channel).await {
            Ok(stream) => return stream,
            Err(e) => {
                delay = policy.next_delay(delay);
                tracing::warn!(
                    channel,
                    attempt,
                    error = %e,
                    retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Resubscribe failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusError, InMemoryMessageBus};
    use async_trait::async_trait;

    const CHANNEL: &str = "jobs";

    fn fast() -> ResubscribePolicy {
        ResubscribePolicy {
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
        }
    }

    /// In-memory bus whose subscribe can be switched off.
    #[derive(Default)]
    struct SwitchableBus {
        inner: InMemoryMessageBus,
        down: AtomicBool,
    }

    #[async_trait]
    impl MessageBus for SwitchableBus {
        async fn publish(&self, channel: &str, payload: String) -> Result<usize, BusError> {
            self.inner.publish(channel, payload).await
        }

        async fn subscribe(&self, channel: &str) -> Result<MessageStream, BusError> {
            if self.down.load(Ordering::Acquire) {
                return Err(BusError::Subscribe {
                    channel: channel.to_string(),
                    message: "connection refused".to_string(),
                });
            }
            self.inner.subscribe(channel).await
        }

        async fn ping(&self) -> Result<(), BusError> {
            Ok(())
        }
    }

    async fn eventually(condition: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("condition never held");
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let policy = fast();
        assert_eq!(policy.next_delay(Duration::from_millis(5)), Duration::from_millis(10));
        assert_eq!(policy.next_delay(Duration::from_millis(15)), Duration::from_millis(20));
        assert_eq!(policy.next_delay(Duration::from_millis(20)), Duration::from_millis(20));
    }

    #[test]
    fn health_starts_unsubscribed() {
        assert!(!SubscriptionHealth::new().is_subscribed());
    }

    #[tokio::test]
    async fn stream_survives_closed_channel() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let first = bus.subscribe(CHANNEL).await.unwrap();
        let health = SubscriptionHealth::new();
        let mut stream = resubscribing(Arc::clone(&bus), CHANNEL, first, health.clone(), fast());
        assert!(health.is_subscribed());

        bus.publish(CHANNEL, "one".to_string()).await.unwrap();
        assert_eq!(stream.next().await.as_deref(), Some("one"));

        bus.close_channel(CHANNEL);
        let reader = tokio::spawn(async move { stream.next().await });

        eventually(|| bus.subscriber_count(CHANNEL) == 1).await;
        assert!(health.is_subscribed());

        bus.publish(CHANNEL, "two".to_string()).await.unwrap();
        assert_eq!(reader.await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn health_reports_outage_until_resubscribed() {
        let bus = Arc::new(SwitchableBus::default());
        let first = bus.subscribe(CHANNEL).await.unwrap();
        let health = SubscriptionHealth::new();
        let mut stream = resubscribing(Arc::clone(&bus), CHANNEL, first, health.clone(), fast());

        bus.down.store(true, Ordering::Release);
        bus.inner.close_channel(CHANNEL);
        let reader = tokio::spawn(async move { stream.next().await });

        eventually(|| !health.is_subscribed()).await;
        // still retrying
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!health.is_subscribed());

        bus.down.store(false, Ordering::Release);
        eventually(|| health.is_subscribed()).await;
        eventually(|| bus.inner.subscriber_count(CHANNEL) == 1).await;

        bus.publish(CHANNEL, "after outage".to_string()).await.unwrap();
        assert_eq!(reader.await.unwrap().as_deref(), Some("after outage"));
    }
}
