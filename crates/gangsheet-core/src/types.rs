//! # Domain Types
//!
//! Core domain types used throughout the gang sheet engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PricingSettings │   │   PricingTier   │   │ BillableDims    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  increment      │   │  min / max sqin │   │  width / height │       │
//! │  │  min w / h      │   │  rate per sqin  │   │  billable sqin  │       │
//! │  │  min billable   │   │  sort_order     │   │  area_units     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   QueueItem     │   │   Placement     │   │   BatchSheet    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  requested size │──►│  x, y (inches)  │──►│  placements     │       │
//! │  │  qty            │   │  width, height  │   │  length_in      │       │
//! │  │  source_key     │   │  rotation = 0   │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Units
//! - Physical dimensions: `f64` inches
//! - Billing areas: `i64` area units (one rounding increment squared)
//! - Money: `Money` (integer cents)

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Pricing Settings
// =============================================================================

/// Rounding and minimum rules applied to every priced item.
///
/// Immutable per calculation. Validate with
/// [`validate_pricing_settings`](crate::validation::validate_pricing_settings)
/// at the settings-edit boundary; pricing functions assume valid values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingSettings {
    /// Quantization step (inches) billed dimensions round up to.
    pub rounding_increment_in: f64,
    /// Smallest billable width.
    pub min_width_in: f64,
    /// Smallest billable height.
    pub min_height_in: f64,
    /// Floor on billable area per item.
    pub min_billable_sq_in: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            rounding_increment_in: 0.25,
            min_width_in: 2.0,
            min_height_in: 2.0,
            min_billable_sq_in: 4.0,
        }
    }
}

// =============================================================================
// Pricing Tier
// =============================================================================

/// A contiguous range of total billable area mapped to a flat rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingTier {
    /// Persisted identifier; `None` for tiers not yet saved.
    #[serde(default)]
    pub id: Option<String>,
    /// Inclusive lower bound (square inches).
    pub min_sq_in: f64,
    /// Inclusive upper bound; `None` means open-ended (last tier only).
    pub max_sq_in: Option<f64>,
    /// Rate in dollars per square inch.
    pub rate_per_sq_in: f64,
    /// Position in the admin's tier table.
    pub sort_order: i32,
}

impl PricingTier {
    /// Creates an unsaved tier.
    pub fn new(min_sq_in: f64, max_sq_in: Option<f64>, rate_per_sq_in: f64, sort_order: i32) -> Self {
        PricingTier {
            id: None,
            min_sq_in,
            max_sq_in,
            rate_per_sq_in,
            sort_order,
        }
    }

    /// Attaches a persisted identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether `total_sq_in` falls inside `[min, max]` (inclusive).
    #[inline]
    pub fn contains(&self, total_sq_in: f64) -> bool {
        total_sq_in >= self.min_sq_in && self.max_sq_in.map_or(true, |max| total_sq_in <= max)
    }

    /// Whether this tier has no upper bound.
    #[inline]
    pub fn is_open_ended(&self) -> bool {
        self.max_sq_in.is_none()
    }

    /// The shop's starter tier table.
    pub fn default_table() -> Vec<PricingTier> {
        vec![
            PricingTier::new(0.0, Some(100.0), 0.12, 1),
            PricingTier::new(101.0, Some(300.0), 0.10, 2),
            PricingTier::new(301.0, Some(600.0), 0.09, 3),
            PricingTier::new(601.0, None, 0.08, 4),
        ]
    }
}

// =============================================================================
// Billable Dimensions
// =============================================================================

/// Rounded-up, minimum-enforced size used for pricing.
///
/// Derived from the requested size; never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillableDimensions {
    /// Display only.
    pub billable_width_in: f64,
    /// Display only.
    pub billable_height_in: f64,
    /// Display only; equals `area_units / denom²`.
    pub billable_sq_in: f64,
    /// Integer count of increment² cells; the billing accumulator.
    pub area_units: i64,
}

// =============================================================================
// Requested Item (order intake)
// =============================================================================

/// One line of a singles order as the customer entered it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RequestedItem {
    pub width_in: f64,
    pub height_in: f64,
    pub qty: i64,
}

// =============================================================================
// Queue Item
// =============================================================================

/// An ordered print item waiting to be batched.
///
/// Created on order placement and consumed exactly once by a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QueueItem {
    pub id: String,
    pub order_id: String,
    /// Requested width, pre-rounding. Layout uses this, not the billed width.
    pub width_in: f64,
    /// Requested height, pre-rounding.
    pub height_in: f64,
    pub qty: i64,
    /// Object store key of the source image (upload or library asset).
    #[serde(default)]
    pub source_key: Option<String>,
}

// =============================================================================
// Sheet Configuration
// =============================================================================

/// Physical constraints of a production sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SheetConfig {
    pub sheet_width_in: f64,
    /// Safe margin kept clear on every edge.
    pub margin_in: f64,
    /// Gap between neighbouring items and between rows.
    pub spacing_in: f64,
    /// Longest sheet the printer accepts.
    pub max_length_in: f64,
}

impl SheetConfig {
    /// Widest item that can ever fit on a row.
    #[inline]
    pub fn printable_width_in(&self) -> f64 {
        self.sheet_width_in - 2.0 * self.margin_in
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            sheet_width_in: 22.5,
            margin_in: 0.15,
            spacing_in: 0.1,
            max_length_in: 60.0,
        }
    }
}

// =============================================================================
// Placement
// =============================================================================

/// One item instance positioned on a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Placement {
    pub item_id: String,
    /// Left edge of the bounding box (inches).
    pub x_in: f64,
    /// Top edge of the bounding box (inches).
    pub y_in: f64,
    pub width_in: f64,
    pub height_in: f64,
    /// Always 0; no rotation is attempted.
    pub rotation_deg: i32,
}

impl Placement {
    #[inline]
    pub fn right_in(&self) -> f64 {
        self.x_in + self.width_in
    }

    #[inline]
    pub fn bottom_in(&self) -> f64 {
        self.y_in + self.height_in
    }

    /// Whether two placements share any interior area.
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x_in < other.right_in()
            && other.x_in < self.right_in()
            && self.y_in < other.bottom_in()
            && other.y_in < self.bottom_in()
    }
}

// =============================================================================
// Batch Status
// =============================================================================

/// Production workflow state of a batch sheet.
///
/// ```text
/// GENERATED ──► PRINTED
///     ▲
///     └──────► ARCHIVED  (and back)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum BatchStatus {
    /// Freshly packed and rendered.
    Generated,
    /// Sent through the printer.
    Printed,
    /// Hidden from the default batch list.
    Archived,
}

impl BatchStatus {
    /// Whether the workflow allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: BatchStatus) -> bool {
        matches!(
            (self, next),
            (BatchStatus::Generated, BatchStatus::Printed)
                | (BatchStatus::Generated, BatchStatus::Archived)
                | (BatchStatus::Archived, BatchStatus::Generated)
        )
    }
}

impl Default for BatchStatus {
    fn default() -> Self {
        BatchStatus::Generated
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Generated => write!(f, "GENERATED"),
            BatchStatus::Printed => write!(f, "PRINTED"),
            BatchStatus::Archived => write!(f, "ARCHIVED"),
        }
    }
}

// =============================================================================
// Batch Sheet
// =============================================================================

/// A packed production sheet.
///
/// Geometry is fixed at creation; only `status` and `notes` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BatchSheet {
    pub id: String,
    /// Object store key of the rendered PNG.
    pub export_key: String,
    /// Used sheet length (inches), never above the configured max.
    pub length_in: f64,
    pub status: BatchStatus,
    pub notes: Option<String>,
    pub placements: Vec<Placement>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_status_transitions() {
        use BatchStatus::*;

        assert!(Generated.can_transition_to(Printed));
        assert!(Generated.can_transition_to(Archived));
        assert!(Archived.can_transition_to(Generated));

        assert!(!Printed.can_transition_to(Generated));
        assert!(!Printed.can_transition_to(Archived));
        assert!(!Archived.can_transition_to(Printed));
        assert!(!Generated.can_transition_to(Generated));
    }

    #[test]
    fn test_batch_status_serializes_uppercase() {
        let json = serde_json::to_string(&BatchStatus::Archived).unwrap();
        assert_eq!(json, "\"ARCHIVED\"");
        let parsed: BatchStatus = serde_json::from_str("\"PRINTED\"").unwrap();
        assert_eq!(parsed, BatchStatus::Printed);
    }

    #[test]
    fn test_tier_contains_is_inclusive() {
        let tier = PricingTier::new(101.0, Some(300.0), 0.10, 2);
        assert!(tier.contains(101.0));
        assert!(tier.contains(300.0));
        assert!(!tier.contains(300.25));
        assert!(!tier.contains(100.0));

        let open = PricingTier::new(301.0, None, 0.09, 3);
        assert!(open.contains(1_000_000.0));
        assert!(open.is_open_ended());
    }

    #[test]
    fn test_placement_overlap() {
        let a = Placement {
            item_id: "a".into(),
            x_in: 0.0,
            y_in: 0.0,
            width_in: 2.0,
            height_in: 2.0,
            rotation_deg: 0,
        };
        let touching = Placement { x_in: 2.0, ..a.clone() };
        let crossing = Placement { x_in: 1.0, y_in: 1.0, ..a.clone() };

        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&crossing));
    }

    #[test]
    fn test_sheet_defaults() {
        let sheet = SheetConfig::default();
        assert_eq!(sheet.sheet_width_in, 22.5);
        assert!((sheet.printable_width_in() - 22.2).abs() < 1e-9);
    }
}
