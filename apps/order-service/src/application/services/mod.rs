//! Application services.

mod product_service;
mod reconciler;

pub use product_service::ProductService;
pub use reconciler::{PaymentResultReconciler, ReconcileOutcome, ReconcilerStats};
