//! # Money Module
//!
//! Provides the `Money` type and the integer-only billing arithmetic.
//!
//! ## Why Integer Area Units?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT DRIFT PROBLEM                                       │
//! │                                                                         │
//! │  Summing float square inches across many fractional items:             │
//! │    Σ (2.25 × 2.75) × qty  → tiny errors accumulate per line            │
//! │    then × 0.12 × 100      → subtotal can land 1 cent off               │
//! │                                                                         │
//! │  OUR SOLUTION: count increment² cells as integers                      │
//! │    2.25 × 2.75 @ 0.25  =  9 × 11 = 99 area units (exact)               │
//! │    subtotal = round(units × rate_cents / denom²)  (one rounding)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gangsheet_core::money::Money;
//!
//! // 96 area units (a 3" × 2" item at 0.25") at $0.12 / sq in
//! let subtotal = Money::from_area_units(96, 4, 12);
//! assert_eq!(subtotal.cents(), 72);
//! assert_eq!(subtotal.to_string(), "$0.72");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Every subtotal that leaves this crate is a `Money`; only the UI formats
/// dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use gangsheet_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Prices a number of area units at a per-square-inch rate.
    ///
    /// ## Arguments
    /// * `area_units` - Total billable area in increment² cells
    /// * `denom` - Increment units per inch (4 for a 0.25" increment)
    /// * `rate_cents` - Rate in cents per square inch
    ///
    /// ## Implementation
    /// `round(area_units × rate_cents / denom²)` in i128, rounding half away
    /// from zero. One rounding step for the whole order. Saturates at the
    /// `i64` bounds.
    pub fn from_area_units(area_units: i64, denom: i64, rate_cents: i64) -> Money {
        let numerator = area_units as i128 * rate_cents as i128;
        let denominator = (denom as i128) * (denom as i128);
        let cents = div_round_half_away(numerator, denominator);
        Money::from_cents(i64::try_from(cents).unwrap_or(if cents < 0 { i64::MIN } else { i64::MAX }))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }
}

/// Converts a dollars-per-square-inch rate into whole cents.
///
/// ## Example
/// ```rust
/// use gangsheet_core::money::rate_to_cents;
///
/// assert_eq!(rate_to_cents(0.12), 12);
/// assert_eq!(rate_to_cents(0.08), 8);
/// ```
#[inline]
pub fn rate_to_cents(rate_per_sq_in: f64) -> i64 {
    (rate_per_sq_in * 100.0).round() as i64
}

/// Integer division rounding half away from zero.
fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    if denominator == 0 {
        return 0;
    }
    let sign = if (numerator < 0) != (denominator < 0) { -1 } else { 1 };
    let (n, d) = (numerator.abs(), denominator.abs());
    sign * ((2 * n + d) / (2 * d))
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly `$d.cc` rendering; the UI does localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
        assert_eq!(format!("{}", Money::from_cents(-7)), "-$0.07");
    }

    #[test]
    fn test_area_units_three_by_two() {
        // 3" × 2" at 0.25": 12 × 8 = 96 units, denom 4, $0.12 → 72 cents
        assert_eq!(Money::from_area_units(96, 4, 12).cents(), 72);
    }

    #[test]
    fn test_area_units_round_half_up() {
        // 1 unit at 0.25" with 8 cents: 8 / 16 = 0.5 → 1 cent
        assert_eq!(Money::from_area_units(1, 4, 8).cents(), 1);
        // 7 / 16 = 0.4375 → 0 cents
        assert_eq!(Money::from_area_units(1, 4, 7).cents(), 0);
    }

    #[test]
    fn test_rate_to_cents() {
        assert_eq!(rate_to_cents(0.12), 12);
        assert_eq!(rate_to_cents(0.1), 10);
        assert_eq!(rate_to_cents(0.09), 9);
    }

    #[test]
    fn test_zero_denominator_is_zero() {
        assert_eq!(Money::from_area_units(10, 0, 12).cents(), 0);
    }

    #[test]
    fn test_area_units_saturate() {
        assert_eq!(Money::from_area_units(i64::MAX, 1, 100).cents(), i64::MAX);
    }
}
