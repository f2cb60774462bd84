//! Decimal helpers for the string-encoded numbers returned by the subgraph
//! and the block explorer.
//!
//! Display values are rounded to two places with the half-up rule
//! (midpoint away from zero) on exact decimal arithmetic, so
//! `"0.01" * "3000.5"` renders as `"30.01"`.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Number of decimal places shown for prices and amounts
pub const DISPLAY_DECIMALS: u32 = 2;

/// Parse a decimal string, accepting plain and scientific notation.
///
/// Returns `None` for empty or malformed input instead of failing.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Round half-up to two places and format with exactly two decimals.
pub fn format_fixed(value: Decimal) -> String {
    let rounded =
        value.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// USD price of a token given its ETH-denominated price and the ETH/USD price.
pub fn usd_price(derived_eth: &str, eth_price: &str) -> Option<String> {
    let derived = parse_decimal(derived_eth)?;
    let eth = parse_decimal(eth_price)?;
    derived.checked_mul(eth).map(format_fixed)
}

/// Format a raw amount string to two decimals.
///
/// Amounts too large for a `Decimal` (raw token units can exceed 28 digits)
/// fall back to floating point.
pub fn format_amount(raw: &str) -> Option<String> {
    if let Some(value) = parse_decimal(raw) {
        return Some(format_fixed(value));
    }
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| format!("{:.2}", v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_rounds_half_up() {
        assert_eq!(usd_price("0.01", "3000.5").as_deref(), Some("30.01"));
        assert_eq!(usd_price("1", "1800").as_deref(), Some("1800.00"));
        assert_eq!(usd_price("0.0004", "2500.25").as_deref(), Some("1.00"));
    }

    #[test]
    fn price_requires_both_operands() {
        assert_eq!(usd_price("", "3000"), None);
        assert_eq!(usd_price("0.5", "not-a-number"), None);
    }

    #[test]
    fn parses_scientific_notation() {
        assert_eq!(parse_decimal("1e-2"), Some(Decimal::new(1, 2)));
    }

    #[test]
    fn formats_amounts_beyond_decimal_range() {
        assert_eq!(format_amount("1234.5").as_deref(), Some("1234.50"));
        let huge = "1".repeat(40);
        let formatted = format_amount(&huge).expect("float fallback");
        assert!(formatted.ends_with(".00"));
        assert_eq!(format_amount("abc"), None);
    }
}
