//! Money calculation utilities using rust_decimal for precision
//!
//! All cycle/ledger arithmetic goes through `Decimal` internally, then back
//! to `f64` for storage/serialization, rounded to 2 decimal places.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Precise a + b
pub fn add(a: f64, b: f64) -> f64 {
    to_f64(to_decimal(a) + to_decimal(b))
}

/// Precise a - b
pub fn sub(a: f64, b: f64) -> f64 {
    to_f64(to_decimal(a) - to_decimal(b))
}

/// Precise a - b, floored at 0
pub fn sub_floor0(a: f64, b: f64) -> f64 {
    to_f64((to_decimal(a) - to_decimal(b)).max(Decimal::ZERO))
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

/// A remaining balance counts as settled below the comparison tolerance
pub fn is_settled(remaining: f64) -> bool {
    to_decimal(remaining) < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        assert_eq!(add(0.1, 0.2), 0.3);
    }

    #[test]
    fn test_accumulation_precision() {
        let mut total = 0.0;
        for _ in 0..1000 {
            total = add(total, 0.01);
        }
        assert_eq!(total, 10.0);
    }

    #[test]
    fn test_sub_floor0() {
        assert_eq!(sub_floor0(1000.0, 400.0), 600.0);
        assert_eq!(sub_floor0(400.0, 1000.0), 0.0);
        assert_eq!(sub_floor0(0.3, 0.1), 0.2);
    }

    #[test]
    fn test_money_eq() {
        assert!(money_eq(100.0, 100.0));
        assert!(money_eq(100.004, 100.006));
        assert!(!money_eq(100.0, 100.02));
    }

    #[test]
    fn test_is_settled() {
        assert!(is_settled(0.0));
        assert!(is_settled(0.005));
        assert!(is_settled(-5.0));
        assert!(!is_settled(0.01));
        assert!(!is_settled(600.0));
    }

    #[test]
    fn test_non_finite_becomes_zero() {
        // NaN/Infinity are rejected by Decimal::from_f64 and fall back to 0
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
    }
}
