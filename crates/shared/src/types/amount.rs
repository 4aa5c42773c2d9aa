//! Decimal amount helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in the system is a `rust_decimal::Decimal`.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Debit/credit differences must stay strictly below this (0.01 currency unit).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Errors produced while parsing user-entered amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    /// The text is not a decimal number.
    #[error("'{0}' is not a valid amount")]
    Malformed(String),

    /// Amounts are entered as positive numbers; the debit/credit column carries the sign.
    #[error("Amount cannot be negative: {0}")]
    Negative(Decimal),
}

/// Returns true if `a` and `b` differ by strictly less than `tolerance`.
///
/// A difference of exactly one tolerance unit (100.00 against 99.99) is unbalanced.
#[must_use]
pub fn within_tolerance(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    (a - b).abs() < tolerance
}

/// Parses an amount typed into a debit or credit field.
///
/// Blank input is zero. Thousands separators (`,`) are ignored.
///
/// # Errors
///
/// Returns an error for malformed or negative input.
pub fn parse_amount(input: &str) -> Result<Decimal, AmountParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    let value = Decimal::from_str(&cleaned)
        .map_err(|_| AmountParseError::Malformed(trimmed.to_string()))?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmountParseError::Negative(value));
    }

    Ok(value.normalize())
}
