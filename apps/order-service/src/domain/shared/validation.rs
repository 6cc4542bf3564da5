//! Field checks for write requests.

use rust_decimal::Decimal;

use super::errors::ValidationError;

/// Largest value a `NUMERIC(12, 2)` column holds.
pub const MAX_MONETARY_VALUE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

const MONETARY_SCALE: u32 = 2;

/// Trim `value` and reject it when nothing is left.
pub fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(trimmed.to_string())
}

/// Accept a strictly positive amount with at most two decimal places.
pub fn require_money(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }
    if value.normalize().scale() > MONETARY_SCALE {
        return Err(ValidationError::new(
            field,
            "must have at most two decimal places",
        ));
    }
    if value > MAX_MONETARY_VALUE {
        return Err(ValidationError::new(
            field,
            format!("must not exceed {MAX_MONETARY_VALUE}"),
        ));
    }
    Ok(value)
}
