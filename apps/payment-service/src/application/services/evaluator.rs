//! Payment Evaluator Service
//!
//! Consumes `payment_requests`, applies the [`PaymentPolicy`] and publishes
//! one [`PaymentResult`] per decodable request on `payment_results`.
//!
//! Each message is handled independently. A malformed payload or a failed
//! publish is logged and counted, and the loop moves on to the next
//! message. Nothing is retried.

use std::sync::Arc;

use futures::StreamExt;
use payment_messaging::{
    BusError, ContractError, MessageBus, MessageStream, PAYMENT_RESULTS, PaymentRequest,
    PaymentResult, publish_json,
};
use tokio_util::sync::CancellationToken;

use crate::domain::PaymentPolicy;
use crate::infrastructure::metrics::{self, RequestOutcome};

/// What happened to a single payment request.
#[derive(Debug, Clone)]
pub enum EvaluationOutcome {
    /// Result published.
    Published {
        /// The decision sent.
        result: PaymentResult,
        /// Subscribers that received it (zero means the result was lost).
        receivers: usize,
    },
    /// Payload was dropped because it failed the schema check.
    Malformed {
        /// Decode error.
        error: ContractError,
    },
    /// Decision was taken but the bus rejected the result.
    PublishFailed {
        /// The decision that could not be sent.
        result: PaymentResult,
        /// Bus error.
        error: BusError,
    },
}

/// Counters accumulated by [`PaymentEvaluator::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluatorStats {
    /// Payloads received.
    pub received: u64,
    /// Results published.
    pub published: u64,
    /// Payloads dropped as malformed.
    pub malformed: u64,
    /// Results the bus rejected.
    pub publish_failed: u64,
}

impl EvaluatorStats {
    fn record(&mut self, outcome: &EvaluationOutcome) {
        self.received += 1;
        match outcome {
            EvaluationOutcome::Published { .. } => self.published += 1,
            EvaluationOutcome::Malformed { .. } => self.malformed += 1,
            EvaluationOutcome::PublishFailed { .. } => self.publish_failed += 1,
        }
    }
}

/// Stateless payment evaluator.
pub struct PaymentEvaluator<B>
where
    B: MessageBus,
{
    bus: Arc<B>,
    policy: PaymentPolicy,
}

impl<B> PaymentEvaluator<B>
where
    B: MessageBus,
{
    /// Create a new evaluator.
    pub const fn new(bus: Arc<B>, policy: PaymentPolicy) -> Self {
        Self { bus, policy }
    }

    /// Decision policy in use.
    pub const fn policy(&self) -> &PaymentPolicy {
        &self.policy
    }

    /// Decode a request payload and decide it. Performs no I/O.
    pub fn evaluate(&self, payload: &str) -> Result<PaymentResult, ContractError> {
        let request = PaymentRequest::decode(payload)?;
        let status = self.policy.decide(request.amount);

        tracing::info!(
            order_id = %request.order_id,
            amount = %request.amount,
            status = %status,
            "Payment evaluated"
        );

        Ok(PaymentResult::new(request.order_id, status))
    }

    /// Evaluate one payload and publish the result.
    pub async fn handle(&self, payload: &str) -> EvaluationOutcome {
        let result = match self.evaluate(payload) {
            Ok(result) => result,
            Err(error) => {
                tracing::warn!(error = %error, "Dropping malformed payment request");
                metrics::record_request(RequestOutcome::Malformed);
                return EvaluationOutcome::Malformed { error };
            }
        };
        metrics::record_decision(result.status);

        match publish_json(self.bus.as_ref(), PAYMENT_RESULTS, &result).await {
            Ok(receivers) => {
                if receivers == 0 {
                    tracing::warn!(
                        order_id = %result.order_id,
                        "Payment result published with no subscribers"
                    );
                    metrics::record_request(RequestOutcome::Undelivered);
                } else {
                    metrics::record_request(RequestOutcome::Published);
                }
                EvaluationOutcome::Published { result, receivers }
            }
            Err(error) => {
                tracing::error!(
                    order_id = %result.order_id,
                    error = %error,
                    "Failed to publish payment result"
                );
                metrics::record_request(RequestOutcome::PublishFailed);
                EvaluationOutcome::PublishFailed { result, error }
            }
        }
    }

    /// Consume payment requests until the stream ends or `cancel` fires.
    ///
    /// Pass a [`payment_messaging::resubscribing`] stream to keep consuming
    /// across lost subscriptions.
    pub async fn run(&self, mut requests: MessageStream, cancel: CancellationToken) -> EvaluatorStats {
        let mut stats = EvaluatorStats::default();
        tracing::info!(threshold = %self.policy.threshold(), "Payment evaluator started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::info!("Payment evaluator cancelled");
                    break;
                }
                next = requests.next() => {
                    let Some(payload) = next else {
                        tracing::warn!("Payment request stream ended");
                        break;
                    };
                    let outcome = self.handle(&payload).await;
                    stats.record(&outcome);
                }
            }
        }

        tracing::info!(
            received = stats.received,
            published = stats.published,
            malformed = stats.malformed,
            publish_failed = stats.publish_failed,
            "Payment evaluator stopped"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use payment_messaging::{
        InMemoryMessageBus, PAYMENT_REQUESTS, PaymentStatus, ResubscribePolicy,
        SubscriptionHealth, resubscribing,
    };
    use std::time::Duration;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tokio_test::assert_err;
    use uuid::Uuid;

    // Bus that refuses every publish
    struct FailingBus;

    #[async_trait]
    impl MessageBus for FailingBus {
        async fn publish(&self, channel: &str, _payload: String) -> Result<usize, BusError> {
            Err(BusError::Publish {
                channel: channel.to_string(),
                message: "connection reset".to_string(),
            })
        }

        async fn subscribe(&self, channel: &str) -> Result<MessageStream, BusError> {
            Err(BusError::Subscribe {
                channel: channel.to_string(),
                message: "unsupported".to_string(),
            })
        }

        async fn ping(&self) -> Result<(), BusError> {
            Ok(())
        }
    }

    fn request_payload(order_id: Uuid, amount: Decimal) -> String {
        let now = Utc::now();
        PaymentRequest {
            order_id,
            amount,
            customer_id: "c1".to_string(),
            product_id: "p1".to_string(),
            created_at: now,
            updated_at: now,
        }
        .encode()
        .unwrap()
    }

    #[test]
    fn evaluate_applies_policy() {
        let evaluator = PaymentEvaluator::new(
            Arc::new(InMemoryMessageBus::new()),
            PaymentPolicy::default(),
        );
        let id = Uuid::new_v4();

        let ok = evaluator.evaluate(&request_payload(id, dec!(1000))).unwrap();
        assert_eq!(ok, PaymentResult::new(id, PaymentStatus::Success));

        let declined = evaluator
            .evaluate(&request_payload(id, dec!(1000.01)))
            .unwrap();
        assert_eq!(declined.status, PaymentStatus::Failure);
    }

    #[test]
    fn evaluate_rejects_malformed_payload() {
        let evaluator = PaymentEvaluator::new(
            Arc::new(InMemoryMessageBus::new()),
            PaymentPolicy::default(),
        );
        assert_err!(evaluator.evaluate(r#"{"order_id": 1}"#));
    }

    #[tokio::test]
    async fn handle_publishes_result() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let mut results = bus.subscribe(PAYMENT_RESULTS).await.unwrap();
        let evaluator = PaymentEvaluator::new(Arc::clone(&bus), PaymentPolicy::default());
        let id = Uuid::new_v4();

        let outcome = evaluator.handle(&request_payload(id, dec!(500))).await;
        assert!(matches!(
            outcome,
            EvaluationOutcome::Published { receivers: 1, .. }
        ));

        let result = PaymentResult::decode(&results.next().await.unwrap()).unwrap();
        assert_eq!(result, PaymentResult::new(id, PaymentStatus::Success));
    }

    #[tokio::test]
    async fn handle_reports_publish_failure() {
        let evaluator = PaymentEvaluator::new(Arc::new(FailingBus), PaymentPolicy::default());
        let outcome = evaluator
            .handle(&request_payload(Uuid::new_v4(), dec!(5000)))
            .await;

        match outcome {
            EvaluationOutcome::PublishFailed { result, .. } => {
                assert_eq!(result.status, PaymentStatus::Failure);
            }
            other => panic!("expected PublishFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_survives_malformed_message() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let requests = bus.subscribe(PAYMENT_REQUESTS).await.unwrap();
        let mut results = bus.subscribe(PAYMENT_RESULTS).await.unwrap();
        let evaluator = PaymentEvaluator::new(Arc::clone(&bus), PaymentPolicy::default());

        let id = Uuid::new_v4();
        bus.publish(PAYMENT_REQUESTS, "garbage".to_string())
            .await
            .unwrap();
        bus.publish(PAYMENT_REQUESTS, request_payload(id, dec!(250)))
            .await
            .unwrap();
        bus.close_channel(PAYMENT_REQUESTS);

        let stats = evaluator.run(requests, CancellationToken::new()).await;
        assert_eq!(
            stats,
            EvaluatorStats {
                received: 2,
                published: 1,
                malformed: 1,
                publish_failed: 0,
            }
        );

        let result = PaymentResult::decode(&results.next().await.unwrap()).unwrap();
        assert_eq!(result.order_id, id);
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let requests = bus.subscribe(PAYMENT_REQUESTS).await.unwrap();
        let evaluator = PaymentEvaluator::new(Arc::clone(&bus), PaymentPolicy::default());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let stats = evaluator.run(requests, cancel).await;
        assert_eq!(stats, EvaluatorStats::default());
    }

    #[tokio::test]
    async fn run_keeps_consuming_after_resubscribe() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let first = bus.subscribe(PAYMENT_REQUESTS).await.unwrap();
        let mut results = bus.subscribe(PAYMENT_RESULTS).await.unwrap();
        let listener = SubscriptionHealth::new();
        let requests = resubscribing(
            Arc::clone(&bus),
            PAYMENT_REQUESTS,
            first,
            listener.clone(),
            ResubscribePolicy {
                initial_delay: Duration::from_millis(5),
                max_delay: Duration::from_millis(20),
            },
        );

        let evaluator = PaymentEvaluator::new(Arc::clone(&bus), PaymentPolicy::default());
        let cancel = CancellationToken::new();
        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move { evaluator.run(requests, cancel).await })
        };

        bus.close_channel(PAYMENT_REQUESTS);
        tokio::time::timeout(Duration::from_secs(2), async {
            while bus.subscriber_count(PAYMENT_REQUESTS) == 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("evaluator never resubscribed");
        assert!(listener.is_subscribed());

        let id = Uuid::new_v4();
        bus.publish(PAYMENT_REQUESTS, request_payload(id, dec!(42)))
            .await
            .unwrap();
        let result = tokio::time::timeout(Duration::from_secs(1), results.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(PaymentResult::decode(&result).unwrap().order_id, id);
        assert!(!task.is_finished());

        cancel.cancel();
        let stats = task.await.unwrap();
        assert_eq!(stats.received, 1);
    }
}
