//! Order Bounded Context
//!
//! An order is written once as `pending` and later moved to exactly one
//! terminal status by the payment result it is correlated with.
//!
//! # Key Concepts
//!
//! - **Order**: the persisted record, correlated with payment messages by ID
//! - **OrderStateMachine**: `pending -> completed | failed`, nothing else
//! - **OrderStore**: persistence port; status updates are single statements

mod entity;
mod errors;
mod id;
mod repository;
mod state_machine;
mod status;

pub use entity::{NewOrder, Order};
pub use errors::OrderError;
pub use id::OrderId;
pub use repository::OrderStore;
pub use state_machine::OrderStateMachine;
pub use status::OrderStatus;
