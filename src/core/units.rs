//! Conversions between human-typed decimal amounts and integer base units.

use ethers::types::U256;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::core::errors::AmountError;

/// Fractional digits of ETH (wei per ether = 10^18).
pub const ETHER_DECIMALS: usize = 18;

/// Fractional digits shown on the balance card.
pub const DISPLAY_DECIMALS: u32 = 4;

static PLAIN_DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d*)(?:\.(\d*))?$").expect("Decimal regex pattern should always be valid")
});

/// Converts an ether amount such as `"1.5"` into wei.
pub fn parse_ether_exact(raw: &str) -> Result<U256, AmountError> {
    parse_units_exact(raw, ETHER_DECIMALS)
}

/// Converts a plain decimal string into base units with `decimals` fractional digits.
///
/// Rounding rule: digits beyond `decimals` are dropped only when they are all
/// zero, so the result is always exact. A non-zero digit past the unit's
/// precision yields [`AmountError::TooPrecise`]. Signs and exponents are not
/// accepted, and zero is rejected.
pub fn parse_units_exact(raw: &str, decimals: usize) -> Result<U256, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(AmountError::NotPositive);
    }
    let caps = PLAIN_DECIMAL_RE
        .captures(trimmed)
        .ok_or_else(|| AmountError::NotDecimal(trimmed.to_string()))?;
    let int = caps.get(1).map_or("", |m| m.as_str());
    let frac = caps.get(2).map_or("", |m| m.as_str());
    if int.is_empty() && frac.is_empty() {
        return Err(AmountError::NotDecimal(trimmed.to_string()));
    }

    let (kept, dropped) = frac.split_at(frac.len().min(decimals));
    if dropped.bytes().any(|b| b != b'0') {
        return Err(AmountError::TooPrecise { max: decimals });
    }

    let whole = if int.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(int).map_err(|_| AmountError::Overflow)?
    };
    let fraction = if kept.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(kept)
            .map_err(|_| AmountError::Overflow)?
            .checked_mul(U256::exp10(decimals - kept.len()))
            .ok_or(AmountError::Overflow)?
    };

    let value = whole
        .checked_mul(U256::exp10(decimals))
        .and_then(|w| w.checked_add(fraction))
        .ok_or(AmountError::Overflow)?;
    if value.is_zero() {
        return Err(AmountError::NotPositive);
    }
    Ok(value)
}

/// Renders a decimal balance string with exactly [`DISPLAY_DECIMALS`] digits,
/// rounding half away from zero. Display only: comparisons use the full value.
pub fn format_display_amount(amount: &str) -> Option<String> {
    let value = Decimal::from_str(amount.trim()).ok()?;
    let mut rounded =
        value.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DISPLAY_DECIMALS);
    Some(rounded.to_string())
}
