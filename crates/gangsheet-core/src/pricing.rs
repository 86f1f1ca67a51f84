//! # Pricing Calculator
//!
//! Converts requested sizes into billable area and billable area into money.
//!
//! ## Pricing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Requested 1.0" × 1.5"  (qty 10)                                        │
//! │       │                                                                 │
//! │       ▼  clamp to minimums (2" × 2")                                    │
//! │       ▼  ceil to increment units (8 × 8 at 0.25")                       │
//! │       ▼  area_units = 64, floor at min billable (4 sq in = 64 units)    │
//! │       │                                                                 │
//! │  Σ area_units × qty over every line  ──►  640 units = 40 sq in          │
//! │       │                                                                 │
//! │       ▼  select_tier(40)  →  0–100 @ $0.12                              │
//! │       ▼  round(640 × 12 / 16)                                           │
//! │  Subtotal: 480 cents                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is pure and total for valid settings. Settings are
//! validated once at the edit boundary, not on every call.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{rate_to_cents, Money};
use crate::types::{BillableDimensions, PricingSettings, PricingTier, RequestedItem};
use crate::validation::{validate_pricing_settings, validate_requested_item};

// =============================================================================
// Increment Arithmetic
// =============================================================================

/// Ceiling that ignores binary float noise.
///
/// The nearest whole unit wins when it still covers `value` (1.1 / 0.1 is
/// 11.000000000000002 and bills 11 units); otherwise the true ceiling,
/// bumped once more if float error leaves it short.
fn ceil_units(value: f64, increment: f64) -> i64 {
    let quotient = value / increment;
    let nearest = quotient.round();
    if nearest * increment >= value {
        return nearest as i64;
    }
    let ceiling = quotient.ceil();
    if ceiling * increment >= value {
        ceiling as i64
    } else {
        (ceiling as i64).saturating_add(1)
    }
}

/// Number of whole increments needed to cover `value`.
///
/// ## Example
/// ```rust
/// use gangsheet_core::pricing::to_increment_units;
///
/// assert_eq!(to_increment_units(2.01, 0.25), 9);
/// assert_eq!(to_increment_units(4.0, 0.25), 16);
/// ```
#[inline]
pub fn to_increment_units(value: f64, increment: f64) -> i64 {
    ceil_units(value, increment)
}

/// Smallest multiple of `increment` that is ≥ `value`.
///
/// ## Example
/// ```rust
/// use gangsheet_core::pricing::round_to_increment;
///
/// assert_eq!(round_to_increment(2.01, 0.25), 2.25);
/// assert_eq!(round_to_increment(4.0, 0.25), 4.0);
/// ```
#[inline]
pub fn round_to_increment(value: f64, increment: f64) -> f64 {
    to_increment_units(value, increment) as f64 * increment
}

/// Increment units per inch (4 for 0.25").
#[inline]
pub fn increment_denominator(increment: f64) -> i64 {
    (1.0 / increment).round() as i64
}

// =============================================================================
// Billable Dimensions
// =============================================================================

/// Computes the billable size of one item.
///
/// ## Steps
/// 1. Clamp width/height up to the configured minimums
/// 2. Ceil each to whole increment units
/// 3. `area_units = width_units × height_units` (exact)
/// 4. Floor the area at `ceil(min_billable_sq_in × denom²)` units
///
/// Total for any positive finite size: products saturate at `i64::MAX`
/// instead of wrapping. Order intake bounds sizes well below that.
///
/// ## Example
/// ```rust
/// use gangsheet_core::pricing::compute_billable_dimensions;
/// use gangsheet_core::PricingSettings;
///
/// let billable = compute_billable_dimensions(1.0, 1.5, &PricingSettings::default());
/// assert_eq!(billable.billable_width_in, 2.0);
/// assert_eq!(billable.billable_height_in, 2.0);
/// assert_eq!(billable.billable_sq_in, 4.0);
/// assert_eq!(billable.area_units, 64);
/// ```
pub fn compute_billable_dimensions(
    width_in: f64,
    height_in: f64,
    settings: &PricingSettings,
) -> BillableDimensions {
    let increment = settings.rounding_increment_in;
    let width = width_in.max(settings.min_width_in);
    let height = height_in.max(settings.min_height_in);

    let denom = increment_denominator(increment);
    let denom_sq = denom.saturating_mul(denom);

    let width_units = to_increment_units(width, increment);
    let height_units = to_increment_units(height, increment);
    let min_area_units = ceil_units(settings.min_billable_sq_in, 1.0 / denom_sq as f64);
    let area_units = width_units.saturating_mul(height_units).max(min_area_units);

    BillableDimensions {
        billable_width_in: width_units as f64 * increment,
        billable_height_in: height_units as f64 * increment,
        billable_sq_in: area_units as f64 / denom_sq as f64,
        area_units,
    }
}

// =============================================================================
// Tier Selection
// =============================================================================

/// Picks the rate tier for a total billable area.
///
/// ## Rules
/// - Tiers are considered ascending by `min_sq_in`
/// - First tier with `min ≤ total ≤ max` wins (a total equal to `max`
///   stays in that tier)
/// - No match falls back to the highest tier
/// - An empty table returns `None`: pricing is unavailable
///
/// ## Example
/// ```rust
/// use gangsheet_core::pricing::select_tier;
/// use gangsheet_core::PricingTier;
///
/// let tiers = vec![
///     PricingTier::new(0.0, Some(100.0), 0.12, 1),
///     PricingTier::new(101.0, Some(300.0), 0.10, 2),
///     PricingTier::new(301.0, None, 0.09, 3),
/// ];
/// assert_eq!(select_tier(100.0, &tiers).unwrap().rate_per_sq_in, 0.12);
/// assert_eq!(select_tier(101.0, &tiers).unwrap().rate_per_sq_in, 0.10);
/// ```
pub fn select_tier(total_sq_in: f64, tiers: &[PricingTier]) -> Option<&PricingTier> {
    let mut sorted: Vec<&PricingTier> = tiers.iter().collect();
    sorted.sort_by(|a, b| a.min_sq_in.total_cmp(&b.min_sq_in));

    sorted
        .iter()
        .find(|tier| tier.contains(total_sq_in))
        .or_else(|| sorted.last())
        .copied()
}

// =============================================================================
// Subtotal
// =============================================================================

/// Prices a total area through the integer path.
///
/// `round(total_area_units × round(rate × 100) / denom²)` cents. This is the
/// only billing path; multiplying float square inches by a float rate drifts
/// when many fractional items are summed.
///
/// ## Example
/// ```rust
/// use gangsheet_core::pricing::subtotal_cents_from_area_units;
///
/// // 3" × 2" at 0.25" is 96 units
/// assert_eq!(subtotal_cents_from_area_units(96, 0.25, 0.12).cents(), 72);
/// ```
pub fn subtotal_cents_from_area_units(total_area_units: i64, increment: f64, rate_per_sq_in: f64) -> Money {
    Money::from_area_units(
        total_area_units,
        increment_denominator(increment),
        rate_to_cents(rate_per_sq_in),
    )
}

// =============================================================================
// Order Quote
// =============================================================================

/// One priced line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteLine {
    pub item: RequestedItem,
    pub billable: BillableDimensions,
    /// `billable.area_units × qty`.
    pub line_area_units: i64,
}

/// Full price breakdown of a singles order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderQuote {
    pub lines: Vec<QuoteLine>,
    pub total_area_units: i64,
    /// Display only; derived from `total_area_units`.
    pub total_sq_in: f64,
    pub tier_rate_per_sq_in: f64,
    pub subtotal: Money,
}

/// Prices a whole order.
///
/// ## Errors
/// - `Validation` for bad settings or lines (non-positive size, qty 0, ...)
///   or when the order's total area does not fit in `i64` area units
/// - `PricingUnavailable` when no tiers are configured
pub fn quote_order(
    items: &[RequestedItem],
    settings: &PricingSettings,
    tiers: &[PricingTier],
) -> CoreResult<OrderQuote> {
    validate_pricing_settings(settings)?;
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        }
        .into());
    }

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        validate_requested_item(item)?;
        let billable = compute_billable_dimensions(item.width_in, item.height_in, settings);
        let line_area_units = billable
            .area_units
            .checked_mul(item.qty)
            .ok_or_else(area_too_large)?;
        lines.push(QuoteLine {
            item: *item,
            billable,
            line_area_units,
        });
    }

    let total_area_units = lines
        .iter()
        .try_fold(0i64, |total, line| total.checked_add(line.line_area_units))
        .ok_or_else(area_too_large)?;
    let denom = increment_denominator(settings.rounding_increment_in);
    let total_sq_in = total_area_units as f64 / (denom * denom) as f64;

    let tier = select_tier(total_sq_in, tiers).ok_or(CoreError::PricingUnavailable)?;
    let subtotal = subtotal_cents_from_area_units(
        total_area_units,
        settings.rounding_increment_in,
        tier.rate_per_sq_in,
    );

    Ok(OrderQuote {
        lines,
        total_area_units,
        total_sq_in,
        tier_rate_per_sq_in: tier.rate_per_sq_in,
        subtotal,
    })
}

fn area_too_large() -> CoreError {
    ValidationError::invalid("items", "total billable area is too large to price").into()
}

// =============================================================================
// Unit Tests
// =============================================================================
