//! Common utility functions for payroll calculations.
//!
//! This module provides shared functionality used across the resolver, the
//! statutory calculator and the tax calculator, including rounding and
//! percentage arithmetic.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(322.625)), dec!(322.63));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(0)), dec!(0));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Applies a percentage expressed in whole units (`40` means 40%).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(50000), dec!(40)), dec!(20000));
/// assert_eq!(percent_of(dec!(50000), dec!(12.5)), dec!(6250));
/// ```
pub fn percent_of(
    base: Decimal,
    percent: Decimal,
) -> Decimal {
    base * percent / Decimal::ONE_HUNDRED
}
