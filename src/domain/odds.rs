//! Price and currency conversions.
//!
//! All rounding goes through `rust_decimal` so that values such as
//! `0.22 * 100` land on exactly `22.0` instead of `22.000000000000004`.
//! Midpoints round half away from zero.

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;

fn round_decimal(value: Decimal) -> Option<f64> {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
}

/// Round to 2 decimal places.
///
/// Non-finite input is returned unchanged.
pub fn round2(value: f64) -> f64 {
    Decimal::from_f64(value).and_then(round_decimal).unwrap_or(value)
}

/// Convert a decimal (European) price into an implied probability percentage.
///
/// `100 / price`, rounded to 2 d.p. A price of `1.0` or below is degenerate
/// certainty and maps to exactly `100`.
pub fn decimal_odds_to_implied_probability(price: f64) -> f64 {
    if price <= 1.0 {
        return 100.0;
    }
    round2(100.0 / price)
}

/// Convert a `[0, 1]` share price into a percentage, rounded to 2 d.p.
pub fn probability_decimal_to_percent(probability: f64) -> f64 {
    Decimal::from_f64(probability)
        .and_then(|p| p.checked_mul(dec!(100)))
        .and_then(round_decimal)
        .unwrap_or(probability * 100.0)
}

/// Linear currency conversion, rounded to 2 d.p.
pub fn convert_currency(amount: f64, rate: f64) -> f64 {
    round2(amount * rate)
}

/// Midpoint of two probabilities, rounded to 2 d.p.
pub fn midpoint(a: f64, b: f64) -> f64 {
    Decimal::from_f64(a)
        .zip(Decimal::from_f64(b))
        .and_then(|(a, b)| a.checked_add(b))
        .and_then(|sum| round_decimal(sum / dec!(2)))
        .unwrap_or_else(|| round2((a + b) / 2.0))
}

/// Absolute gap between two probabilities, rounded to 2 d.p.
pub fn spread(a: f64, b: f64) -> f64 {
    round2((a - b).abs())
}
