//! Persistence Adapters
//!
//! Postgres implementations of the store ports for deployment, and
//! in-memory ones with the same semantics for tests and local runs.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryOrderStore, InMemoryProductStore};
pub use postgres::{MIGRATOR, PostgresOrderStore, PostgresProductStore, connect};
