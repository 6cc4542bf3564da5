//! Product catalogue records.
//!
//! Orders reference products by free-text ID; nothing joins the two.

mod entity;
mod repository;

pub use entity::{NewProduct, Product};
pub use repository::ProductStore;
