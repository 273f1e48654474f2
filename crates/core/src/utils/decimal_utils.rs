//! Numeric normalization for loosely typed ledger fields.
//!
//! The ledger store enforces no schema on amounts, so the same field arrives
//! as a JSON number, a numeric string, a blank string or `null` depending on
//! which client wrote the row.

use log::warn;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::errors::{CalculatorError, ValidationError};

/// Parse a ledger string into a Decimal.
///
/// Blank input is zero. Plain and scientific notation are accepted; NaN,
/// infinities and anything else are rejected.
pub fn parse_decimal_str(raw: &str) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }

    match Decimal::from_str(trimmed) {
        Ok(d) => Ok(d),
        Err(e_decimal) => {
            if let Ok(d) = Decimal::from_scientific(trimmed) {
                return Ok(d);
            }
            match f64::from_str(trimmed) {
                Ok(f_val) if f_val.is_finite() => Decimal::from_f64(f_val)
                    .ok_or_else(|| ValidationError::NonFinite(trimmed.to_string())),
                Ok(_) => Err(ValidationError::NonFinite(trimmed.to_string())),
                Err(_) => Err(ValidationError::DecimalParse(e_decimal)),
            }
        }
    }
}

/// Parse a JSON ledger value into a Decimal.
///
/// `null` and blank strings are zero, not errors.
pub fn parse_decimal(value: &Value) -> Result<Decimal, ValidationError> {
    match value {
        Value::Null => Ok(Decimal::ZERO),
        Value::String(s) => parse_decimal_str(s),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Decimal::from(u))
            } else {
                // serde_json prints the shortest round-trip form, so "0.1" stays 0.1
                parse_decimal_str(&n.to_string())
            }
        }
        Value::Bool(b) => Err(ValidationError::InvalidInput(format!(
            "expected a number, got boolean {}",
            b
        ))),
        Value::Array(_) | Value::Object(_) => Err(ValidationError::InvalidInput(
            "expected a number, got a structured value".to_string(),
        )),
    }
}

/// Lenient variant of [`parse_decimal`]: malformed input becomes zero.
pub fn to_decimal(value: &Value) -> Decimal {
    parse_decimal(value).unwrap_or_else(|e| {
        warn!("Unparsable numeric value {}: {}. Using 0.", value, e);
        Decimal::ZERO
    })
}

/// `a + b`, or [`CalculatorError::Overflow`] naming the figure being computed.
pub fn checked_add(a: Decimal, b: Decimal, figure: &str) -> Result<Decimal, CalculatorError> {
    a.checked_add(b)
        .ok_or_else(|| CalculatorError::Overflow(figure.to_string()))
}

pub fn checked_sub(a: Decimal, b: Decimal, figure: &str) -> Result<Decimal, CalculatorError> {
    a.checked_sub(b)
        .ok_or_else(|| CalculatorError::Overflow(figure.to_string()))
}

pub fn checked_mul(a: Decimal, b: Decimal, figure: &str) -> Result<Decimal, CalculatorError> {
    a.checked_mul(b)
        .ok_or_else(|| CalculatorError::Overflow(figure.to_string()))
}
