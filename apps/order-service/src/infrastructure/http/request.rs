//! HTTP request DTOs.
//!
//! Missing fields deserialize to empty values so that validation, not the
//! JSON decoder, names the offending field.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::domain::{NewOrder, NewProduct, ValidationError};

/// Body of `POST /order`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderRequest {
    /// Customer reference, as a JSON string or integer.
    #[serde(default, deserialize_with = "reference")]
    pub customer_id: String,
    /// Product reference, as a JSON string or integer.
    #[serde(default, deserialize_with = "reference")]
    pub product_id: String,
    /// Order amount, as a JSON number or numeric string.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl CreateOrderRequest {
    /// Validate into domain input.
    pub fn into_new_order(self) -> Result<NewOrder, ValidationError> {
        let amount = self
            .amount
            .ok_or_else(|| ValidationError::new("amount", "is required"))?;
        NewOrder::new(&self.customer_id, &self.product_id, amount)
    }
}

/// Opaque reference sent either as text or as a whole number.
#[derive(Deserialize)]
#[serde(untagged)]
enum Reference {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

fn reference<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Reference::deserialize(deserializer)? {
        Reference::Text(text) => text,
        Reference::Signed(n) => n.to_string(),
        Reference::Unsigned(n) => n.to_string(),
    })
}

/// Body of `POST /product`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProductRequest {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Unit price, as a JSON number or numeric string.
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl CreateProductRequest {
    /// Validate into domain input.
    pub fn into_new_product(self) -> Result<NewProduct, ValidationError> {
        let price = self
            .price
            .ok_or_else(|| ValidationError::new("price", "is required"))?;
        NewProduct::new(&self.name, price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_amount_accepts_number_or_string() {
        let from_number: CreateOrderRequest =
            serde_json::from_str(r#"{"customer_id":"c1","product_id":"p1","amount":250.5}"#)
                .unwrap();
        let from_string: CreateOrderRequest =
            serde_json::from_str(r#"{"customer_id":"c1","product_id":"p1","amount":"250.5"}"#)
                .unwrap();
        assert_eq!(from_number.amount, Some(dec!(250.5)));
        assert_eq!(from_string.amount, Some(dec!(250.5)));
    }

    #[test]
    fn missing_amount_is_a_validation_error() {
        let request: CreateOrderRequest =
            serde_json::from_str(r#"{"customer_id":"c1","product_id":"p1"}"#).unwrap();
        assert_eq!(
            request.into_new_order().unwrap_err().to_string(),
            "amount is required"
        );
    }

    #[test]
    fn missing_reference_is_a_validation_error() {
        let request: CreateOrderRequest =
            serde_json::from_str(r#"{"product_id":"p1","amount":10}"#).unwrap();
        assert_eq!(request.into_new_order().unwrap_err().field, "customer_id");
    }

    #[test]
    fn numeric_references_become_text() {
        let request: CreateOrderRequest =
            serde_json::from_str(r#"{"customer_id":42,"product_id":7,"amount":10}"#).unwrap();
        assert_eq!(request.customer_id, "42");
        assert_eq!(request.product_id, "7");

        let order = request.into_new_order().unwrap();
        assert_eq!(order.customer_id(), "42");
        assert_eq!(order.product_id(), "7");
    }

    #[test]
    fn fractional_reference_is_rejected() {
        let result = serde_json::from_str::<CreateOrderRequest>(
            r#"{"customer_id":4.2,"product_id":"p1","amount":10}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn product_request_validates() {
        let request: CreateProductRequest =
            serde_json::from_str(r#"{"name":"Widget","price":19.99}"#).unwrap();
        let product = request.into_new_product().unwrap();
        assert_eq!(product.price(), dec!(19.99));

        let missing: CreateProductRequest = serde_json::from_str(r#"{"name":"Widget"}"#).unwrap();
        assert!(missing.into_new_product().is_err());
    }
}
