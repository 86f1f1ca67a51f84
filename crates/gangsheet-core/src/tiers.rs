//! # Tier Table
//!
//! Whole-table checks and reconciliation for the admin's pricing tiers.
//!
//! ## Partition Rule
//! ```text
//! sort_order:   1            2             3
//!           [0 ── 100]  [101 ── 300]  [301 ── ∞)
//!                    └─+1─┘        └─+1─┘
//! ```
//! Sorted by `sort_order`, each tier starts exactly one square inch after
//! the previous one ends. Only the last tier may be open-ended.
//!
//! Validation is advisory: an edit batch is checked as a whole and the
//! message goes back to the admin unchanged.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::TierRangeError;
use crate::types::PricingTier;

/// Distance between one tier's max and the next tier's min (square inches).
pub const TIER_STEP_SQ_IN: f64 = 1.0;

const BOUNDARY_EPSILON: f64 = 1e-9;

// =============================================================================
// Range Validation
// =============================================================================

/// Checks that a proposed tier table partitions the area axis.
///
/// ## Rules (checked in this order)
/// 1. At least one tier
/// 2. Every bounded tier has `min < max`
/// 3. Only the last tier (by `sort_order`) is open-ended
/// 4. `next.min == current.max + 1` for every consecutive pair
///
/// ## Example
/// ```rust
/// use gangsheet_core::tiers::validate_tier_ranges;
/// use gangsheet_core::{PricingTier, TierRangeError};
///
/// let gap = vec![
///     PricingTier::new(0.0, Some(100.0), 0.12, 1),
///     PricingTier::new(150.0, Some(300.0), 0.10, 2),
/// ];
/// assert!(matches!(
///     validate_tier_ranges(&gap),
///     Err(TierRangeError::NotContiguous { .. })
/// ));
/// assert!(validate_tier_ranges(&PricingTier::default_table()).is_ok());
/// ```
pub fn validate_tier_ranges(tiers: &[PricingTier]) -> Result<(), TierRangeError> {
    if tiers.is_empty() {
        return Err(TierRangeError::Empty);
    }

    let mut sorted: Vec<&PricingTier> = tiers.iter().collect();
    sorted.sort_by_key(|tier| tier.sort_order);

    for tier in &sorted {
        if let Some(max) = tier.max_sq_in {
            if tier.min_sq_in >= max {
                return Err(TierRangeError::MinNotBelowMax {
                    sort_order: tier.sort_order,
                });
            }
        }
    }

    for pair in sorted.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        let Some(max) = current.max_sq_in else {
            return Err(TierRangeError::OpenEndedNotLast {
                sort_order: current.sort_order,
            });
        };
        if (next.min_sq_in - (max + TIER_STEP_SQ_IN)).abs() > BOUNDARY_EPSILON {
            return Err(TierRangeError::NotContiguous {
                after_sort_order: current.sort_order,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Reconciliation
// =============================================================================

/// What to do to the persisted tier table to make it match an edit.
///
/// Apply all three lists in one transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierSyncPlan {
    /// Ids of persisted tiers missing from the edit.
    pub delete: Vec<String>,
    /// Incoming tiers whose id is already persisted.
    pub update: Vec<PricingTier>,
    /// Incoming tiers with no id, or an id that is not persisted.
    pub create: Vec<PricingTier>,
}

impl TierSyncPlan {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.update.is_empty() && self.create.is_empty()
    }
}

/// Diffs the persisted tiers against an incoming edit.
///
/// ## Example
/// ```rust
/// use gangsheet_core::tiers::plan_tier_sync;
/// use gangsheet_core::PricingTier;
///
/// let existing = vec![
///     PricingTier::new(0.0, Some(100.0), 0.12, 1).with_id("a"),
///     PricingTier::new(101.0, None, 0.10, 2).with_id("b"),
/// ];
/// let incoming = vec![
///     PricingTier::new(0.0, Some(200.0), 0.11, 1).with_id("a"),
///     PricingTier::new(201.0, None, 0.09, 2),
/// ];
/// let plan = plan_tier_sync(&existing, &incoming);
/// assert_eq!(plan.delete, vec!["b".to_string()]);
/// assert_eq!(plan.update.len(), 1);
/// assert_eq!(plan.create.len(), 1);
/// ```
pub fn plan_tier_sync(existing: &[PricingTier], incoming: &[PricingTier]) -> TierSyncPlan {
    let existing_ids: HashSet<&str> = existing.iter().filter_map(|t| t.id.as_deref()).collect();
    let incoming_ids: HashSet<&str> = incoming.iter().filter_map(|t| t.id.as_deref()).collect();

    let delete = existing
        .iter()
        .filter_map(|t| t.id.as_deref())
        .filter(|id| !incoming_ids.contains(id))
        .map(str::to_string)
        .collect();

    let (update, create): (Vec<PricingTier>, Vec<PricingTier>) = incoming
        .iter()
        .cloned()
        .partition(|t| t.id.as_deref().is_some_and(|id| existing_ids.contains(id)));

    TierSyncPlan {
        delete,
        update,
        create,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        assert_eq!(validate_tier_ranges(&PricingTier::default_table()), Ok(()));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(validate_tier_ranges(&[]), Err(TierRangeError::Empty));
    }

    #[test]
    fn test_rejects_min_not_below_max() {
        let tiers = vec![
            PricingTier::new(0.0, Some(100.0), 0.12, 1),
            PricingTier::new(101.0, Some(101.0), 0.10, 2),
        ];
        assert_eq!(
            validate_tier_ranges(&tiers),
            Err(TierRangeError::MinNotBelowMax { sort_order: 2 })
        );
    }

    #[test]
    fn test_rejects_open_ended_in_middle() {
        let tiers = vec![
            PricingTier::new(0.0, None, 0.12, 1),
            PricingTier::new(101.0, Some(300.0), 0.10, 2),
        ];
        assert_eq!(
            validate_tier_ranges(&tiers),
            Err(TierRangeError::OpenEndedNotLast { sort_order: 1 })
        );
    }

    #[test]
    fn test_rejects_gap_and_overlap() {
        let gap = vec![
            PricingTier::new(0.0, Some(100.0), 0.12, 1),
            PricingTier::new(150.0, Some(300.0), 0.10, 2),
        ];
        assert_eq!(
            validate_tier_ranges(&gap),
            Err(TierRangeError::NotContiguous { after_sort_order: 1 })
        );

        let overlap = vec![
            PricingTier::new(0.0, Some(100.0), 0.12, 1),
            PricingTier::new(90.0, Some(300.0), 0.10, 2),
        ];
        assert!(validate_tier_ranges(&overlap).is_err());
    }

    #[test]
    fn test_orders_by_sort_order_not_input_position() {
        let tiers = vec![
            PricingTier::new(101.0, None, 0.10, 2),
            PricingTier::new(0.0, Some(100.0), 0.12, 1),
        ];
        assert_eq!(validate_tier_ranges(&tiers), Ok(()));
    }

    #[test]
    fn test_single_open_tier_is_valid() {
        let tiers = vec![PricingTier::new(0.0, None, 0.1, 1)];
        assert_eq!(validate_tier_ranges(&tiers), Ok(()));
    }

    #[test]
    fn test_plan_tier_sync() {
        let existing = vec![
            PricingTier::new(0.0, Some(100.0), 0.12, 1).with_id("a"),
            PricingTier::new(101.0, Some(300.0), 0.10, 2).with_id("b"),
            PricingTier::new(301.0, None, 0.09, 3).with_id("c"),
        ];
        let incoming = vec![
            PricingTier::new(0.0, Some(150.0), 0.12, 1).with_id("a"),
            PricingTier::new(151.0, None, 0.10, 2).with_id("c"),
            PricingTier::new(0.0, None, 0.10, 3).with_id("stale"),
        ];

        let plan = plan_tier_sync(&existing, &incoming);
        assert_eq!(plan.delete, vec!["b".to_string()]);
        assert_eq!(
            plan.update.iter().map(|t| t.id.clone().unwrap()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
        assert_eq!(plan.create.len(), 1);
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_plan_tier_sync_noop() {
        let tiers = vec![PricingTier::new(0.0, None, 0.1, 1).with_id("a")];
        let plan = plan_tier_sync(&tiers, &tiers);
        assert!(plan.delete.is_empty());
        assert!(plan.create.is_empty());
        assert_eq!(plan.update.len(), 1);
    }
}
