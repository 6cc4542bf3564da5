//! Application use cases.

mod create_order;

pub use create_order::{CreateOrderUseCase, publish_payment_request};
