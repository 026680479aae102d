//! Decimal arithmetic utilities for balance and yield calculations.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Convert a raw on-chain amount in smallest units to a human amount.
///
/// Returns `None` when the amount or the decimal count exceed what
/// `Decimal` can represent.
pub fn from_base_units(raw: u128, decimals: u8) -> Option<Decimal> {
    let raw = i128::try_from(raw).ok()?;
    Decimal::try_from_i128_with_scale(raw, u32::from(decimals))
        .ok()
        .map(|d| d.normalize())
}

/// Annual USD gain from moving `value_usd` into a position paying
/// `apy_delta` more percentage points.
pub fn annual_gain(value_usd: Decimal, apy_delta: Decimal) -> Decimal {
    value_usd * apy_delta / dec!(100)
}

/// Safe division that returns zero if divisor is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator == Decimal::ZERO {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Arithmetic mean, zero for an empty slice.
pub fn mean(values: &[Decimal]) -> Decimal {
    let sum: Decimal = values.iter().copied().sum();
    safe_div(sum, Decimal::from(values.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base_units() {
        assert_eq!(from_base_units(1_000_000_000, 6), Some(dec!(1000)));
        assert_eq!(from_base_units(1_500_000, 6), Some(dec!(1.5)));
        assert_eq!(
            from_base_units(2_500_000_000_000_000_000, 18),
            Some(dec!(2.5))
        );
        assert_eq!(from_base_units(0, 18), Some(Decimal::ZERO));
    }

    #[test]
    fn test_from_base_units_out_of_range() {
        assert_eq!(from_base_units(1, 29), None);
        assert_eq!(from_base_units(u128::MAX, 6), None);
    }

    #[test]
    fn test_annual_gain() {
        assert_eq!(annual_gain(dec!(1000), dec!(1.5)), dec!(15));
        assert_eq!(annual_gain(dec!(0), dec!(3)), Decimal::ZERO);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), Decimal::ZERO);
        assert_eq!(mean(&[dec!(1), dec!(2)]), dec!(1.5));
    }
}
