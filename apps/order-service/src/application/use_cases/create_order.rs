//! Create Order Use Case
//!
//! Writes the order as `pending`, then announces it on `payment_requests`
//! from a separate task. The caller gets the stored order back as soon as
//! the insert completes; the publish never delays or fails the request.

use std::sync::Arc;

use payment_messaging::{BusError, MessageBus, PAYMENT_REQUESTS, PaymentRequest, publish_json};

use crate::domain::{NewOrder, Order, OrderStore, StoreError};
use crate::infrastructure::metrics::{self, PublishOutcome};

/// Use case for creating orders.
pub struct CreateOrderUseCase<S, B>
where
    S: OrderStore,
    B: MessageBus,
{
    store: Arc<S>,
    bus: Arc<B>,
}

impl<S, B> CreateOrderUseCase<S, B>
where
    S: OrderStore,
    B: MessageBus + 'static,
{
    /// Create a new CreateOrderUseCase.
    pub const fn new(store: Arc<S>, bus: Arc<B>) -> Self {
        Self { store, bus }
    }

    /// Execute the use case.
    ///
    /// The payment request is published after this returns, so an order
    /// read back immediately is still `pending`.
    pub async fn execute(&self, input: NewOrder) -> Result<Order, StoreError> {
        let order = self.store.insert(input).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to insert order");
        })?;

        metrics::record_order_created();
        tracing::info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            amount = %order.amount,
            "Order created"
        );

        let bus = Arc::clone(&self.bus);
        let request = order.to_payment_request();
        tokio::spawn(async move {
            let _ = publish_payment_request(bus.as_ref(), &request).await;
        });

        Ok(order)
    }
}

/// Publish one payment request, logging and counting the outcome.
///
/// A zero-receiver publish succeeds but the request is lost: no payment
/// service was subscribed, so the order stays `pending`.
pub async fn publish_payment_request<B>(bus: &B, request: &PaymentRequest) -> Result<usize, BusError>
where
    B: MessageBus + ?Sized,
{
    match publish_json(bus, PAYMENT_REQUESTS, request).await {
        Ok(0) => {
            tracing::warn!(
                order_id = %request.order_id,
                "Payment request published with no subscribers"
            );
            metrics::record_payment_request(PublishOutcome::Undelivered);
            Ok(0)
        }
        Ok(receivers) => {
            tracing::debug!(order_id = %request.order_id, receivers, "Payment request published");
            metrics::record_payment_request(PublishOutcome::Delivered);
            Ok(receivers)
        }
        Err(e) => {
            tracing::error!(
                order_id = %request.order_id,
                error = %e,
                "Failed to publish payment request"
            );
            metrics::record_payment_request(PublishOutcome::Failed);
            Err(e)
        }
    }
}
