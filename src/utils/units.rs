//! Fixed-point conversions between human-readable amounts and raw token units.

use std::str::FromStr;

use alloy::primitives::U256;
use bigdecimal::BigDecimal;

use crate::error::{Result, SwapError};

/// Scales a decimal string by `10^decimals` into raw token units.
///
/// The conversion is exact: `"10"` at 18 decimals is `10 * 10^18`, and input
/// carrying more fractional digits than the token supports is rejected rather
/// than rounded.
///
/// Only plain notation is accepted: an optional `+`, digits and at most one
/// `.`. Exponents such as `1e6` are rejected.
///
/// # Errors
/// * `InvalidAmount` if the string is not a plain non-negative decimal number,
///   has too many fractional digits, or does not fit in 256 bits
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256> {
    let invalid = |reason: &str| SwapError::InvalidAmount {
        amount: amount.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = amount.trim();
    if !is_plain_decimal(trimmed) {
        return Err(invalid("not a plain decimal number"));
    }
    let value = BigDecimal::from_str(trimmed).map_err(|_| invalid("not a decimal number"))?;

    let value = value.normalized();
    if value.fractional_digit_count() > i64::from(decimals) {
        return Err(invalid(&format!("more than {decimals} fractional digits")));
    }

    let (raw, _) = value.with_scale(i64::from(decimals)).into_bigint_and_exponent();
    U256::from_str(&raw.to_string()).map_err(|_| invalid("does not fit in 256 bits"))
}

/// `^\+?\d*\.?\d*$` with at least one digit
fn is_plain_decimal(text: &str) -> bool {
    let unsigned = text.strip_prefix('+').unwrap_or(text);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    digits(whole) && digits(fraction) && !(whole.is_empty() && fraction.is_empty())
}

/// Renders raw token units as a plain decimal string (`1500000` at 6 decimals is `"1.5"`).
#[must_use]
pub fn format_units(raw: U256, decimals: u8) -> String {
    let formatted = to_decimal(raw, decimals).normalized().to_plain_string();
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}

/// Raw token units as a `BigDecimal` scaled by `10^-decimals`.
#[must_use]
pub fn to_decimal(raw: U256, decimals: u8) -> BigDecimal {
    // U256's decimal rendering is always a valid integer literal
    let int = bigdecimal::num_bigint::BigInt::from_str(&raw.to_string()).unwrap_or_default();
    BigDecimal::new(int, i64::from(decimals))
}

/// Integer part of a non-negative decimal as raw units, `None` if it does not fit.
#[must_use]
pub fn truncate_to_raw(value: &BigDecimal) -> Option<U256> {
    let (int, _) = value.with_scale(0).into_bigint_and_exponent();
    U256::from_str(&int.to_string()).ok()
}
