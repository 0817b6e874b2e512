//! Small numeric helpers shared by every aggregation stage.
//!
//! "No data" is always `None` here; the only place an empty set collapses
//! to zero is [`mean_or_zero`], used by the trend metrics.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Arithmetic mean, `None` for an empty set.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().copied().sum();
    Some(sum / Decimal::from(values.len()))
}

/// Arithmetic mean that short-circuits an empty set to zero.
pub fn mean_or_zero(values: &[Decimal]) -> Decimal {
    mean(values).unwrap_or(Decimal::ZERO)
}

/// Safe division: returns Decimal::ZERO when the denominator is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Percent change from `previous` to `current`.
///
/// - previous = 0, current > 0 → 100
/// - previous = 0, current <= 0 → 0
/// - otherwise (current - previous) / |previous| × 100
pub fn percent_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return if current > Decimal::ZERO {
            dec!(100)
        } else {
            Decimal::ZERO
        };
    }
    (current - previous) / previous.abs() * dec!(100)
}
