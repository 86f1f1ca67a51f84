//! # Batch Assembly
//!
//! Turns a queue snapshot into a packed sheet plan.
//!
//! ## Pipeline
//! ```text
//! ┌──────────┐   ┌────────┐   ┌────────┐   ┌──────┐   ┌──────┐   ┌────────┐
//! │  queue   │──►│ filter │──►│ expand │──►│ sort │──►│ pack │──►│ claims │
//! │ snapshot │   │        │   │ by qty │   │      │   │      │   │        │
//! └──────────┘   └────────┘   └────────┘   └──────┘   └──────┘   └────────┘
//! ```
//!
//! Everything here is synchronous and runs to completion on one snapshot
//! before any image work starts.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::packer::{pack, sort_for_packing, PackItem};
use crate::types::{Placement, QueueItem, SheetConfig};
use crate::validation::{validate_queue_item, validate_sheet_config};

// =============================================================================
// Filter
// =============================================================================

/// Which queue items a batch run may consider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "ids", rename_all = "snake_case")]
#[ts(export)]
pub enum BatchFilter {
    /// Every unbatched item.
    #[default]
    All,
    /// Only the listed item ids. Ids not in the queue are ignored.
    Items(Vec<String>),
}

impl BatchFilter {
    /// `Items` with no ids is the same as `All`.
    pub fn from_ids(ids: Vec<String>) -> Self {
        if ids.is_empty() {
            BatchFilter::All
        } else {
            BatchFilter::Items(ids)
        }
    }

    /// Selects matching items, preserving queue order.
    pub fn apply<'a>(&self, queue: &'a [QueueItem]) -> Vec<&'a QueueItem> {
        match self {
            BatchFilter::All => queue.iter().collect(),
            BatchFilter::Items(ids) => {
                let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
                queue
                    .iter()
                    .filter(|item| wanted.contains(item.id.as_str()))
                    .collect()
            }
        }
    }
}

// =============================================================================
// Expansion
// =============================================================================

/// Expands each queue item into `qty` pack items.
///
/// Units are labelled `"<item_id>-<index>"`, index from 0.
///
/// ## Example
/// ```rust
/// use gangsheet_core::assembly::expand_queue;
/// use gangsheet_core::QueueItem;
///
/// let item = QueueItem {
///     id: "oi-1".into(),
///     order_id: "o-1".into(),
///     width_in: 3.0,
///     height_in: 2.0,
///     qty: 2,
///     source_key: Some("uploads/logo.png".into()),
/// };
/// let units = expand_queue([&item]);
/// assert_eq!(units[0].label, "oi-1-0");
/// assert_eq!(units[1].label, "oi-1-1");
/// ```
pub fn expand_queue<'a>(items: impl IntoIterator<Item = &'a QueueItem>) -> Vec<PackItem> {
    items
        .into_iter()
        .flat_map(|item| {
            (0..item.qty.max(0)).map(move |index| PackItem {
                item_id: item.id.clone(),
                label: format!("{}-{}", item.id, index),
                width_in: item.width_in,
                height_in: item.height_in,
                source_key: item.source_key.clone(),
            })
        })
        .collect()
}

// =============================================================================
// Plan
// =============================================================================

/// A placement together with the image it will be filled with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlannedPlacement {
    pub placement: Placement,
    pub source_key: String,
}

/// How many units of one queue item a batch consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemClaim {
    pub item_id: String,
    pub placed_units: i64,
    pub requested_units: i64,
}

impl ItemClaim {
    /// Whether every unit of the item made it onto the sheet.
    pub fn is_complete(&self) -> bool {
        self.placed_units >= self.requested_units
    }
}

/// A packed sheet ready for rasterization and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BatchPlan {
    pub placements: Vec<PlannedPlacement>,
    pub used_length_in: f64,
    /// One claim per queue item with at least one placed unit, in queue order.
    pub claims: Vec<ItemClaim>,
    /// Units left over once the sheet length ran out.
    pub unplaced_labels: Vec<String>,
    /// Units with no source image.
    pub skipped_labels: Vec<String>,
    /// Units wider than the printable width.
    pub oversized_labels: Vec<String>,
}

impl BatchPlan {
    /// Bare placements, as stored on the batch sheet.
    pub fn sheet_placements(&self) -> Vec<Placement> {
        self.placements.iter().map(|p| p.placement.clone()).collect()
    }

    /// Ids of items whose every unit was placed.
    pub fn completed_item_ids(&self) -> Vec<&str> {
        self.claims
            .iter()
            .filter(|claim| claim.is_complete())
            .map(|claim| claim.item_id.as_str())
            .collect()
    }
}

/// Filters, expands, sorts and packs a queue snapshot.
///
/// ## Errors
/// - `CoreError::Validation` for a bad sheet config or a malformed queue item
/// - `CoreError::Pack(NothingPlaced)` when nothing fits
pub fn plan_batch(
    queue: &[QueueItem],
    filter: &BatchFilter,
    config: &SheetConfig,
) -> CoreResult<BatchPlan> {
    validate_sheet_config(config)?;

    let selected = filter.apply(queue);
    for item in &selected {
        validate_queue_item(item)?;
    }

    let mut units = expand_queue(selected.iter().copied());
    sort_for_packing(&mut units);

    let layout = pack(&units, config)?;

    // Units of one item share a source; only units with one get placed.
    let sources: HashMap<&str, &str> = units
        .iter()
        .filter_map(|u| u.source_key.as_deref().map(|key| (u.item_id.as_str(), key)))
        .collect();

    let mut placed_counts: HashMap<&str, i64> = HashMap::new();
    let mut placements = Vec::with_capacity(layout.placements.len());
    for placement in &layout.placements {
        *placed_counts.entry(placement.item_id.as_str()).or_insert(0) += 1;
        let source_key = sources
            .get(placement.item_id.as_str())
            .map(|key| key.to_string())
            .unwrap_or_default();
        placements.push(PlannedPlacement {
            placement: placement.clone(),
            source_key,
        });
    }

    let claims = selected
        .iter()
        .filter_map(|item| {
            placed_counts.get(item.id.as_str()).map(|&placed| ItemClaim {
                item_id: item.id.clone(),
                placed_units: placed,
                requested_units: item.qty,
            })
        })
        .collect();

    Ok(BatchPlan {
        placements,
        used_length_in: layout.used_length_in,
        claims,
        unplaced_labels: layout.unplaced,
        skipped_labels: layout.skipped,
        oversized_labels: layout.oversized,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
