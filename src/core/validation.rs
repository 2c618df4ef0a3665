use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Largest number of integer digits a 96-bit decimal can hold.
const MAX_INTEGER_DIGITS: i64 = 29;
/// Largest scale a 96-bit decimal can hold.
const MAX_FRACTION_DIGITS: usize = 28;

// sign, integer digits, fraction digits, exponent
static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?)(\d*)(?:\.(\d*))?(?:[eE]([+-]?\d+))?$")
        .expect("Hardcoded regex should always compile")
});

/// Parses free-form typed text into a finite decimal.
///
/// Accepts what a user would reasonably type as a number: surrounding
/// whitespace, an optional sign, `5`, `5.`, `.5`, `1.25`, and exponent forms
/// such as `1e-3`. Returns `None` for empty or whitespace-only text and any
/// other characters. Magnitudes beyond the 96-bit decimal range saturate to
/// [`Decimal::MAX`] (or [`Decimal::MIN`]) so they still compare as larger
/// than any balance. Fractional digits past the 28th are dropped.
pub fn parse_numeric(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let caps = NUMERIC_RE.captures(trimmed)?;
    let negative = caps.get(1).map_or("", |m| m.as_str()) == "-";
    let int = caps.get(2).map_or("", |m| m.as_str());
    let frac = caps.get(3).map_or("", |m| m.as_str());
    if int.is_empty() && frac.is_empty() {
        return None;
    }
    let exponent = match caps.get(4) {
        Some(m) => parse_exponent(m.as_str()),
        None => 0,
    };

    let value = match to_plain_decimal(int, frac, exponent) {
        Plain::Digits(plain) => Decimal::from_str(&plain).unwrap_or(Decimal::MAX),
        Plain::Saturated => Decimal::MAX,
    };
    Some(if negative { -value } else { value })
}

/// Returns true when `raw` is a finite number per [`parse_numeric`].
pub fn is_numeric(raw: &str) -> bool {
    parse_numeric(raw).is_some()
}

/// Exponents too long for `i64` clamp; either bound already leaves the
/// decimal range.
fn parse_exponent(digits: &str) -> i64 {
    digits.parse().unwrap_or(if digits.starts_with('-') { i64::MIN } else { i64::MAX })
}

enum Plain {
    Digits(String),
    Saturated,
}

/// Moves the decimal point `exponent` places and returns an unsigned plain
/// decimal string that `rust_decimal` can parse.
fn to_plain_decimal(int: &str, frac: &str, exponent: i64) -> Plain {
    let joined = format!("{int}{frac}");
    let digits = joined.trim_start_matches('0');
    if digits.is_empty() {
        return Plain::Digits("0".to_string());
    }
    let leading_zeros = (joined.len() - digits.len()) as i64;

    // position of the decimal point relative to the first significant digit
    let point = (int.len() as i64).saturating_add(exponent).saturating_sub(leading_zeros);
    if point > MAX_INTEGER_DIGITS {
        return Plain::Saturated;
    }
    if point < -(MAX_FRACTION_DIGITS as i64) {
        return Plain::Digits("0".to_string());
    }

    let (whole, fraction) = if point <= 0 {
        ("0".to_string(), format!("{}{digits}", "0".repeat((-point) as usize)))
    } else if point as usize >= digits.len() {
        (format!("{digits}{}", "0".repeat(point as usize - digits.len())), String::new())
    } else {
        let (w, f) = digits.split_at(point as usize);
        (w.to_string(), f.to_string())
    };

    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    if fraction.is_empty() {
        Plain::Digits(whole)
    } else {
        Plain::Digits(format!("{whole}.{fraction}"))
    }
}
