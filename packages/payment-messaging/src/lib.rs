#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! Payment Messaging - Shared Contracts and Bus
//!
//! The coordination layer between the order and payment services. Neither
//! service calls the other; each reacts to messages on two channels:
//!
//! ```text
//! order-service ──payment_requests──► payment-service
//!       ▲                                   │
//!       └──────────payment_results──────────┘
//! ```
//!
//! - `contracts`: schema-checked payloads for both channels
//! - `bus`: the [`MessageBus`] port plus Redis and in-memory adapters, and
//!   [`resubscribing`] for listeners that must survive a dropped connection
//!
//! Delivery is best effort. Messages published while nobody is subscribed
//! are lost, and there is no acknowledgment or redelivery.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Message contracts for the payment channels.
pub mod contracts;

/// Publish/subscribe bus port and adapters.
pub mod bus;

pub use bus::{
    BusError, InMemoryMessageBus, MessageBus, MessageStream, RedisMessageBus, ResubscribePolicy,
    SubscriptionHealth, publish_json, resubscribing,
};
pub use contracts::{
    ContractError, PAYMENT_REQUESTS, PAYMENT_RESULTS, PaymentRequest, PaymentResult,
    PaymentStatus,
};
