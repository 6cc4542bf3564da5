//! Types shared by the order and product records.

mod errors;
mod validation;

pub use errors::{StoreError, ValidationError};
pub use validation::{MAX_MONETARY_VALUE, require_money, require_text};
