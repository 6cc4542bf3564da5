//! Payment Result Reconciler
//!
//! Consumes `payment_results` and writes each decision onto its order with
//! one `UPDATE`. There is no idempotency guard: a repeated result reapplies
//! and a conflicting result overwrites the earlier one.
//!
//! No outcome stops the loop. Malformed payloads, results for unknown
//! orders and store failures are logged, counted and skipped.

use std::sync::Arc;

use futures::StreamExt;
use payment_messaging::{ContractError, MessageStream, PaymentResult};
use tokio_util::sync::CancellationToken;

use crate::domain::{OrderId, OrderStatus, OrderStore, StoreError};
use crate::infrastructure::metrics::{self, ResultOutcome};

/// What happened to a single payment result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Payload failed the schema check and was dropped.
    Malformed {
        /// Decode error.
        error: ContractError,
    },
    /// Order status overwritten.
    Applied {
        /// Updated order.
        order_id: OrderId,
        /// Status written.
        status: OrderStatus,
    },
    /// No order has this ID; nothing changed.
    Unmatched {
        /// ID from the payload.
        order_id: OrderId,
    },
    /// Store rejected the update; the result is lost.
    StoreFailed {
        /// Order the result was for.
        order_id: OrderId,
        /// Store error.
        error: StoreError,
    },
}

/// Counters accumulated by [`PaymentResultReconciler::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcilerStats {
    /// Payloads received.
    pub received: u64,
    /// Status updates applied.
    pub applied: u64,
    /// Results for unknown orders.
    pub unmatched: u64,
    /// Payloads dropped as malformed.
    pub malformed: u64,
    /// Updates the store rejected.
    pub store_failed: u64,
}

impl ReconcilerStats {
    fn record(&mut self, outcome: &ReconcileOutcome) {
        self.received += 1;
        match outcome {
            ReconcileOutcome::Malformed { .. } => self.malformed += 1,
            ReconcileOutcome::Applied { .. } => self.applied += 1,
            ReconcileOutcome::Unmatched { .. } => self.unmatched += 1,
            ReconcileOutcome::StoreFailed { .. } => self.store_failed += 1,
        }
    }
}

/// Applies payment decisions to stored orders.
pub struct PaymentResultReconciler<S>
where
    S: OrderStore,
{
    store: Arc<S>,
}

impl<S> PaymentResultReconciler<S>
where
    S: OrderStore,
{
    /// Create a new reconciler.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Handle one `payment_results` payload.
    pub async fn apply(&self, payload: &str) -> ReconcileOutcome {
        let result = match PaymentResult::decode(payload) {
            Ok(result) => result,
            Err(error) => {
                tracing::warn!(error = %error, "Dropping malformed payment result");
                metrics::record_payment_result(ResultOutcome::Malformed);
                return ReconcileOutcome::Malformed { error };
            }
        };

        let order_id = OrderId::from(result.order_id);
        let status = OrderStatus::from_payment(result.status);

        match self.store.update_status(&order_id, status).await {
            Ok(0) => {
                tracing::warn!(
                    order_id = %order_id,
                    payment_status = %result.status,
                    "Payment result for unknown order"
                );
                metrics::record_payment_result(ResultOutcome::Unmatched);
                ReconcileOutcome::Unmatched { order_id }
            }
            Ok(_) => {
                tracing::info!(order_id = %order_id, status = %status, "Order status updated");
                metrics::record_payment_result(ResultOutcome::Applied);
                ReconcileOutcome::Applied { order_id, status }
            }
            Err(error) => {
                tracing::error!(
                    order_id = %order_id,
                    status = %status,
                    error = %error,
                    "Failed to update order status"
                );
                metrics::record_payment_result(ResultOutcome::StoreFailed);
                ReconcileOutcome::StoreFailed { order_id, error }
            }
        }
    }

    /// Consume payment results until the stream ends or `cancel` fires.
    ///
    /// Pass a [`payment_messaging::resubscribing`] stream to keep consuming
    /// across lost subscriptions.
    pub async fn run(&self, mut results: MessageStream, cancel: CancellationToken) -> ReconcilerStats {
        let mut stats = ReconcilerStats::default();
        tracing::info!("Payment result reconciler started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::info!("Payment result reconciler cancelled");
                    break;
                }
                next = results.next() => {
                    let Some(payload) = next else {
                        tracing::warn!("Payment result stream ended");
                        break;
                    };
                    let outcome = self.apply(&payload).await;
                    stats.record(&outcome);
                }
            }
        }

        tracing::info!(
            received = stats.received,
            applied = stats.applied,
            unmatched = stats.unmatched,
            malformed = stats.malformed,
            store_failed = stats.store_failed,
            "Payment result reconciler stopped"
        );
        stats
    }
}
