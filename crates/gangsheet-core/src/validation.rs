//! # Validation Module
//!
//! Input validation for settings edits and order intake.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin / order forms                                          │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field rules (positive, finite, ranges)                            │
//! │  └── Relationships (increment divides an inch, margins fit the sheet)  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: tiers::validate_tier_ranges                                  │
//! │  └── Whole-table partition checks                                      │
//! │                                                                         │
//! │  Pricing functions trust their inputs once these pass.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gangsheet_core::validation::{validate_pricing_settings, validate_quantity};
//! use gangsheet_core::PricingSettings;
//!
//! validate_pricing_settings(&PricingSettings::default()).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{PricingSettings, PricingTier, QueueItem, RequestedItem, SheetConfig};
use crate::{MAX_ITEM_DIMENSION_IN, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Tolerance for "is this an integer" checks on float quotients.
pub(crate) const UNIT_EPSILON: f64 = 1e-9;

// =============================================================================
// Numeric Helpers
// =============================================================================

fn require_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> ValidationResult<()> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Positive, finite and no longer than `MAX_ITEM_DIMENSION_IN`.
fn require_item_dimension(field: &str, value: f64) -> ValidationResult<()> {
    require_positive(field, value)?;
    if value > MAX_ITEM_DIMENSION_IN {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_ITEM_DIMENSION_IN as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Settings Validators
// =============================================================================

/// Validates pricing settings before they are saved.
///
/// ## Rules
/// - Every field positive and finite
/// - The rounding increment divides one inch evenly (0.25, 0.125, 0.1, 1, ...)
///   so that an area unit is exactly `1 / denom²` square inches
pub fn validate_pricing_settings(settings: &PricingSettings) -> ValidationResult<()> {
    require_positive("rounding_increment_in", settings.rounding_increment_in)?;
    require_positive("min_width_in", settings.min_width_in)?;
    require_positive("min_height_in", settings.min_height_in)?;
    require_positive("min_billable_sq_in", settings.min_billable_sq_in)?;

    if settings.rounding_increment_in > 1.0 {
        return Err(ValidationError::invalid(
            "rounding_increment_in",
            "must not exceed one inch",
        ));
    }

    let per_inch = 1.0 / settings.rounding_increment_in;
    if (per_inch - per_inch.round()).abs() > UNIT_EPSILON * per_inch.max(1.0) {
        return Err(ValidationError::invalid(
            "rounding_increment_in",
            "must divide one inch evenly",
        ));
    }

    Ok(())
}

/// Validates the physical sheet constraints.
///
/// ## Rules
/// - Width and max length positive; margin and spacing non-negative
/// - Margins leave a printable area in both directions
pub fn validate_sheet_config(sheet: &SheetConfig) -> ValidationResult<()> {
    require_positive("sheet_width_in", sheet.sheet_width_in)?;
    require_positive("max_length_in", sheet.max_length_in)?;
    require_non_negative("margin_in", sheet.margin_in)?;
    require_non_negative("spacing_in", sheet.spacing_in)?;

    if sheet.printable_width_in() <= 0.0 {
        return Err(ValidationError::invalid(
            "margin_in",
            "margins leave no printable width",
        ));
    }
    if sheet.max_length_in - 2.0 * sheet.margin_in <= 0.0 {
        return Err(ValidationError::invalid(
            "margin_in",
            "margins leave no printable length",
        ));
    }

    Ok(())
}

/// Validates the fields of a single tier row.
///
/// ## Rules
/// - `min_sq_in` ≥ 0, `max_sq_in` (if set) finite
/// - `rate_per_sq_in` > 0
/// - `sort_order` ≥ 1
///
/// Range relationships across rows are checked by
/// [`validate_tier_ranges`](crate::tiers::validate_tier_ranges).
pub fn validate_tier_fields(tier: &PricingTier) -> ValidationResult<()> {
    require_non_negative("min_sq_in", tier.min_sq_in)?;
    if let Some(max) = tier.max_sq_in {
        require_finite("max_sq_in", max)?;
    }
    require_positive("rate_per_sq_in", tier.rate_per_sq_in)?;

    if tier.sort_order < 1 {
        return Err(ValidationError::OutOfRange {
            field: "sort_order".to_string(),
            min: 1,
            max: i32::MAX as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "qty".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "qty".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates one order line before it is priced.
pub fn validate_requested_item(item: &RequestedItem) -> ValidationResult<()> {
    require_item_dimension("width_in", item.width_in)?;
    require_item_dimension("height_in", item.height_in)?;
    validate_quantity(item.qty)
}

/// Validates a queue item before it is expanded for packing.
pub fn validate_queue_item(item: &QueueItem) -> ValidationResult<()> {
    if item.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }
    require_item_dimension("width_in", item.width_in)?;
    require_item_dimension("height_in", item.height_in)?;
    validate_quantity(item.qty)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pricing_settings() {
        assert!(validate_pricing_settings(&PricingSettings::default()).is_ok());

        let eighth = PricingSettings {
            rounding_increment_in: 0.125,
            ..PricingSettings::default()
        };
        assert!(validate_pricing_settings(&eighth).is_ok());

        let tenth = PricingSettings {
            rounding_increment_in: 0.1,
            ..PricingSettings::default()
        };
        assert!(validate_pricing_settings(&tenth).is_ok());

        let zero = PricingSettings {
            rounding_increment_in: 0.0,
            ..PricingSettings::default()
        };
        assert!(validate_pricing_settings(&zero).is_err());

        let uneven = PricingSettings {
            rounding_increment_in: 0.3,
            ..PricingSettings::default()
        };
        assert!(validate_pricing_settings(&uneven).is_err());

        let negative_min = PricingSettings {
            min_width_in: -1.0,
            ..PricingSettings::default()
        };
        assert!(validate_pricing_settings(&negative_min).is_err());

        let nan = PricingSettings {
            min_billable_sq_in: f64::NAN,
            ..PricingSettings::default()
        };
        assert!(matches!(
            validate_pricing_settings(&nan),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_validate_sheet_config() {
        assert!(validate_sheet_config(&SheetConfig::default()).is_ok());

        let fat_margin = SheetConfig {
            margin_in: 12.0,
            ..SheetConfig::default()
        };
        assert!(validate_sheet_config(&fat_margin).is_err());

        let negative_spacing = SheetConfig {
            spacing_in: -0.1,
            ..SheetConfig::default()
        };
        assert!(validate_sheet_config(&negative_spacing).is_err());
    }

    #[test]
    fn test_validate_tier_fields() {
        assert!(validate_tier_fields(&PricingTier::new(0.0, Some(100.0), 0.12, 1)).is_ok());
        assert!(validate_tier_fields(&PricingTier::new(-1.0, Some(100.0), 0.12, 1)).is_err());
        assert!(validate_tier_fields(&PricingTier::new(0.0, Some(100.0), 0.0, 1)).is_err());
        assert!(validate_tier_fields(&PricingTier::new(0.0, None, 0.12, 0)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_requested_item() {
        let ok = RequestedItem {
            width_in: 3.0,
            height_in: 2.0,
            qty: 1,
        };
        assert!(validate_requested_item(&ok).is_ok());
        assert!(validate_requested_item(&RequestedItem { width_in: 0.0, ..ok }).is_err());
        assert!(validate_requested_item(&RequestedItem { qty: 0, ..ok }).is_err());
    }

    #[test]
    fn test_item_dimensions_are_bounded() {
        let ok = RequestedItem {
            width_in: 1000.0,
            height_in: 2.0,
            qty: 1,
        };
        assert!(validate_requested_item(&ok).is_ok());
        assert!(matches!(
            validate_requested_item(&RequestedItem { width_in: 1e9, ..ok }),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_requested_item(&RequestedItem { height_in: f64::INFINITY, ..ok }),
            Err(ValidationError::NotFinite { .. })
        ));

        let queued = QueueItem {
            id: "q-1".to_string(),
            order_id: "o-1".to_string(),
            width_in: 2.0,
            height_in: 1000.5,
            qty: 1,
            source_key: None,
        };
        assert!(matches!(
            validate_queue_item(&queued),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_queue_item_requires_id() {
        let item = QueueItem {
            id: "  ".to_string(),
            order_id: "o-1".to_string(),
            width_in: 3.0,
            height_in: 2.0,
            qty: 1,
            source_key: None,
        };
        assert!(matches!(
            validate_queue_item(&item),
            Err(ValidationError::Required { .. })
        ));
    }
}
