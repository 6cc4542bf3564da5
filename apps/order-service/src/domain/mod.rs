//! Domain Layer
//!
//! Entities, value objects and store ports for the order service. Nothing
//! in here performs I/O.
//!
//! - `order`: order record, status state machine, order store port
//! - `product`: product record and product store port
//! - `shared`: validation and store errors used by both

pub mod order;
pub mod product;
pub mod shared;

pub use order::{NewOrder, Order, OrderError, OrderId, OrderStateMachine, OrderStatus, OrderStore};
pub use product::{NewProduct, Product, ProductStore};
pub use shared::{StoreError, ValidationError};
