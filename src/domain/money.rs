//! Decimal money helpers.
//!
//! Ledger amounts are stored in major units with two decimal places. Paystack
//! works in minor units (kobo/pesewas), so the payment adapter converts with
//! [`to_minor_units`] on the way out and [`from_minor_units`] on the way back.

use std::str::FromStr;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, ToPrimitive};

use super::errors::DomainError;

/// Largest amount a `NUMERIC(10, 2)` column can hold.
const MAX_MAJOR_UNITS: i64 = 100_000_000;

/// Parses a positive decimal amount with at most two decimal places.
pub fn parse_amount(field: &str, raw: &str) -> Result<BigDecimal, DomainError> {
    let value = BigDecimal::from_str(raw.trim())
        .map_err(|_| DomainError::invalid(format!("{field} must be a decimal number, got '{raw}'")))?;
    validate_amount(field, &value)?;
    Ok(value.with_scale(2))
}

pub fn validate_amount(field: &str, value: &BigDecimal) -> Result<(), DomainError> {
    if *value <= BigDecimal::from(0) {
        return Err(DomainError::invalid(format!("{field} must be greater than zero")));
    }
    if *value >= BigDecimal::from(MAX_MAJOR_UNITS) {
        return Err(DomainError::invalid(format!("{field} is too large")));
    }
    if !(value.clone() * BigDecimal::from(100)).is_integer() {
        return Err(DomainError::invalid(format!(
            "{field} must have at most two decimal places"
        )));
    }
    Ok(())
}

pub fn to_minor_units(amount: &BigDecimal) -> Result<i64, DomainError> {
    validate_amount("amount", amount)?;
    (amount.clone() * BigDecimal::from(100))
        .to_i64()
        .ok_or_else(|| DomainError::invalid("amount is out of range"))
}

pub fn from_minor_units(minor: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(minor), 2)
}

/// Renders an amount the way it is stored: two decimal places, zero included.
///
/// `BigDecimal`'s `Display` drops the fraction of a zero value, so the digits
/// are laid out from the scaled integer instead.
pub fn format_money(value: &BigDecimal) -> String {
    let (digits, _) = value.with_scale(2).as_bigint_and_exponent();
    let digits = digits.to_string();
    let (sign, magnitude) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };
    let padded = format!("{magnitude:0>3}");
    let (units, cents) = padded.split_at(padded.len() - 2);
    format!("{sign}{units}.{cents}")
}
