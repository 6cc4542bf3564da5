//! Product record.

use rust_decimal::Decimal;

use crate::domain::shared::{ValidationError, require_money, require_text};

/// A persisted product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Store-assigned identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    name: String,
    price: Decimal,
}

impl NewProduct {
    /// Validate product-write fields.
    pub fn new(name: &str, price: Decimal) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require_text("name", name)?,
            price: require_money("price", price)?,
        })
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Attach a store-assigned ID.
    #[must_use]
    pub fn into_product(self, id: i64) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
        }
    }
}
