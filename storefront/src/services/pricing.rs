// storefront/src/services/pricing.rs

//! Cart totals, percentage discounts and minor-unit conversion. All arithmetic is
//! checked; an overflow is reported as a validation error instead of panicking.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{AppError, Result};
use crate::models::CartLine;

const MINOR_UNITS_PER_MAJOR: i64 = 100;

fn overflow() -> AppError {
  AppError::Validation("Cart total is out of range".to_string())
}

/// Rejects an empty cart or lines with a non-positive quantity or a negative price.
pub fn validate_cart(lines: &[CartLine]) -> Result<()> {
  if lines.is_empty() {
    return Err(AppError::Validation("Invalid or empty products array".to_string()));
  }
  for line in lines {
    if line.quantity <= 0 {
      return Err(AppError::Validation(format!(
        "Quantity for product {} must be positive",
        line.product_id
      )));
    }
    if line.unit_price.is_sign_negative() {
      return Err(AppError::Validation(format!(
        "Price for product {} must not be negative",
        line.product_id
      )));
    }
  }
  Ok(())
}

/// `Σ unit_price × quantity`.
pub fn cart_total(lines: &[CartLine]) -> Result<Decimal> {
  lines.iter().try_fold(Decimal::ZERO, |total, line| {
    line
      .unit_price
      .checked_mul(Decimal::from(line.quantity))
      .and_then(|subtotal| total.checked_add(subtotal))
      .ok_or_else(overflow)
  })
}

/// The discount for `percentage`, rounded to a whole currency unit (halves away from zero).
pub fn discount_amount(total: Decimal, percentage: i32) -> Result<Decimal> {
  let raw = total
    .checked_mul(Decimal::from(percentage))
    .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
    .ok_or_else(overflow)?;
  Ok(raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

pub fn apply_discount(total: Decimal, percentage: i32) -> Result<Decimal> {
  let discount = discount_amount(total, percentage)?;
  total.checked_sub(discount).ok_or_else(overflow)
}

/// Converts to the gateway's smallest unit: `round(total × 100)`.
pub fn to_minor_units(total: Decimal) -> Result<i64> {
  total
    .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
    .map(|v| v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    .and_then(|v| v.to_i64())
    .ok_or_else(overflow)
}

/// Exact inverse of the unit scaling: 20000 becomes 200, 1235 becomes 12.35.
pub fn from_minor_units(amount_minor: i64) -> Decimal {
  Decimal::new(amount_minor, 2).normalize()
}
