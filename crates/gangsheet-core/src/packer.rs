//! # Shelf Packer
//!
//! Greedy, single-pass, row-based placement of rectangles on a fixed-width,
//! length-bounded sheet.
//!
//! ## Algorithm
//! ```text
//! ┌────────────────────── sheet_width ──────────────────────┐
//! │ margin                                                  │
//! │   ┌─────┐ sp ┌───┐ sp ┌──────┐          ← row 1         │
//! │   │  A  │    │ B │    │  C   │            (row_height   │
//! │   │     │    └───┘    │      │             = tallest)   │
//! │   └─────┘             └──────┘                          │
//! │   spacing                                               │
//! │   ┌───┐ sp ┌────┐                       ← row 2         │
//! │   │ D │    │ E  │   F doesn't fit in width → wrap       │
//! │   └───┘    └────┘   G doesn't fit in length → STOP      │
//! │ margin                                                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - Deterministic: the same items in the same order give the same layout
//! - No backtracking, no rotation, no shelf rebalancing
//! - The first item that overruns `max_length_in` ends the run; it and every
//!   later item are returned as `unplaced` for the next batch
//! - Items with no source image are skipped before they take any space
//! - Items that cannot fit the printable width on an empty row are reported
//!   as `oversized` and never placed
//!
//! Callers order the input with [`sort_for_packing`] first.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::PackError;
use crate::types::{Placement, SheetConfig};

// =============================================================================
// Input
// =============================================================================

/// One unit to place (a queue item expanded by quantity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PackItem {
    /// Originating queue item.
    pub item_id: String,
    /// Stable per-unit label (`"<item_id>-<index>"`), used to break sort ties.
    pub label: String,
    pub width_in: f64,
    pub height_in: f64,
    pub source_key: Option<String>,
}

/// Orders items for packing: tallest first, ties by label.
///
/// The sort is stable; the resulting order decides the layout.
pub fn sort_for_packing(items: &mut [PackItem]) {
    items.sort_by(|a, b| {
        b.height_in
            .total_cmp(&a.height_in)
            .then_with(|| a.label.cmp(&b.label))
    });
}

// =============================================================================
// Cursor
// =============================================================================

/// Position of the next placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShelfCursor {
    pub x_in: f64,
    pub y_in: f64,
    /// Tallest item on the current row so far.
    pub row_height_in: f64,
}

impl ShelfCursor {
    /// Top-left corner of the printable area, empty row.
    pub fn start(config: &SheetConfig) -> Self {
        ShelfCursor {
            x_in: config.margin_in,
            y_in: config.margin_in,
            row_height_in: 0.0,
        }
    }

    /// Moves to the start of the next row.
    fn wrapped(self, config: &SheetConfig) -> Self {
        ShelfCursor {
            x_in: config.margin_in,
            y_in: self.y_in + self.row_height_in + config.spacing_in,
            row_height_in: 0.0,
        }
    }

    /// Sheet length consumed so far, clipped to the max.
    pub fn used_length_in(&self, config: &SheetConfig) -> f64 {
        config
            .max_length_in
            .min(self.y_in + self.row_height_in + config.margin_in)
    }
}

/// Whether an item is too wide for even an empty row.
fn exceeds_printable_width(item: &PackItem, config: &SheetConfig) -> bool {
    config.margin_in + item.width_in + config.margin_in > config.sheet_width_in
}

// =============================================================================
// Output
// =============================================================================

/// Result of one packing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PackLayout {
    pub placements: Vec<Placement>,
    /// `min(max_length, last row bottom + margin)`.
    pub used_length_in: f64,
    /// Final cursor, including a wrap made for the item that stopped packing.
    pub cursor: ShelfCursor,
    /// Labels of items with no source image.
    pub skipped: Vec<String>,
    /// Labels of items wider than the printable width.
    pub oversized: Vec<String>,
    /// Labels of items left over once the sheet length ran out.
    pub unplaced: Vec<String>,
}

/// Fold state.
struct PackState {
    cursor: ShelfCursor,
    placements: Vec<Placement>,
    skipped: Vec<String>,
    oversized: Vec<String>,
    unplaced: Vec<String>,
    full: bool,
}

impl PackState {
    fn start(config: &SheetConfig, capacity: usize) -> Self {
        PackState {
            cursor: ShelfCursor::start(config),
            placements: Vec::with_capacity(capacity),
            skipped: Vec::new(),
            oversized: Vec::new(),
            unplaced: Vec::new(),
            full: false,
        }
    }

    fn push(mut self, item: &PackItem, config: &SheetConfig) -> Self {
        if self.full {
            self.unplaced.push(item.label.clone());
            return self;
        }
        if item.source_key.is_none() {
            self.skipped.push(item.label.clone());
            return self;
        }
        if exceeds_printable_width(item, config) {
            self.oversized.push(item.label.clone());
            return self;
        }

        let mut cursor = self.cursor;
        if cursor.x_in + item.width_in + config.margin_in > config.sheet_width_in {
            cursor = cursor.wrapped(config);
        }

        if cursor.y_in + item.height_in + config.margin_in > config.max_length_in {
            // Stop, don't skip. A wrap taken for this item still counts.
            self.cursor = cursor;
            self.full = true;
            self.unplaced.push(item.label.clone());
            return self;
        }

        self.placements.push(Placement {
            item_id: item.item_id.clone(),
            x_in: cursor.x_in,
            y_in: cursor.y_in,
            width_in: item.width_in,
            height_in: item.height_in,
            rotation_deg: 0,
        });
        self.cursor = ShelfCursor {
            x_in: cursor.x_in + item.width_in + config.spacing_in,
            y_in: cursor.y_in,
            row_height_in: cursor.row_height_in.max(item.height_in),
        };
        self
    }
}

// =============================================================================
// Pack
// =============================================================================

/// Places `items`, in the given order, onto one sheet.
///
/// ## Errors
/// `PackError::NothingPlaced` when not a single item fits. This is a
/// user-facing "nothing could be batched" condition.
///
/// ## Example
/// ```rust
/// use gangsheet_core::packer::{pack, PackItem};
/// use gangsheet_core::SheetConfig;
///
/// let items: Vec<PackItem> = (0..3)
///     .map(|i| PackItem {
///         item_id: format!("item-{i}"),
///         label: format!("item-{i}-0"),
///         width_in: 5.0,
///         height_in: 10.0,
///         source_key: Some(format!("uploads/{i}.png")),
///     })
///     .collect();
///
/// let layout = pack(&items, &SheetConfig::default()).unwrap();
/// assert_eq!(layout.placements.len(), 3);
/// assert!((layout.used_length_in - 10.3).abs() < 1e-9);
/// ```
pub fn pack(items: &[PackItem], config: &SheetConfig) -> Result<PackLayout, PackError> {
    let state = items
        .iter()
        .fold(PackState::start(config, items.len()), |state, item| state.push(item, config));

    if state.placements.is_empty() {
        return Err(PackError::NothingPlaced {
            considered: items.len(),
        });
    }

    Ok(PackLayout {
        used_length_in: state.cursor.used_length_in(config),
        placements: state.placements,
        cursor: state.cursor,
        skipped: state.skipped,
        oversized: state.oversized,
        unplaced: state.unplaced,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn item(id: &str, width_in: f64, height_in: f64) -> PackItem {
        PackItem {
            item_id: id.to_string(),
            label: format!("{id}-0"),
            width_in,
            height_in,
            source_key: Some(format!("uploads/{id}.png")),
        }
    }

    #[test]
    fn test_single_row() {
        let items = vec![item("a", 5.0, 10.0), item("b", 5.0, 10.0), item("c", 5.0, 10.0)];
        let layout = pack(&items, &SheetConfig::default()).unwrap();

        let xs: Vec<f64> = layout.placements.iter().map(|p| p.x_in).collect();
        assert!((xs[0] - 0.15).abs() < EPS);
        assert!((xs[1] - 5.25).abs() < EPS);
        assert!((xs[2] - 10.35).abs() < EPS);
        assert!(layout.placements.iter().all(|p| (p.y_in - 0.15).abs() < EPS));
        assert!((layout.used_length_in - 10.3).abs() < EPS);
        assert!(layout.unplaced.is_empty());
    }

    #[test]
    fn test_wraps_when_width_is_exhausted() {
        // 0.15 + 10 + 0.1 + 10 = 20.25; a third 10" item needs 30.4 > 22.5
        let items = vec![item("a", 10.0, 4.0), item("b", 10.0, 3.0), item("c", 10.0, 2.0)];
        let layout = pack(&items, &SheetConfig::default()).unwrap();

        let c = &layout.placements[2];
        assert!((c.x_in - 0.15).abs() < EPS);
        // second row starts at margin + tallest (4) + spacing
        assert!((c.y_in - 4.25).abs() < EPS);
        assert!((layout.used_length_in - (4.25 + 2.0 + 0.15)).abs() < EPS);
    }

    #[test]
    fn test_stops_at_max_length_instead_of_skipping() {
        let config = SheetConfig {
            max_length_in: 60.0,
            ..SheetConfig::default()
        };
        // Each item fills a row. The second row would end at 60.4 > 60, so
        // packing stops even though the small third item would fit.
        let items = vec![item("a", 22.0, 30.0), item("b", 22.0, 30.0), item("c", 22.0, 5.0)];
        let layout = pack(&items, &config).unwrap();

        assert_eq!(layout.placements.len(), 1);
        assert_eq!(layout.unplaced, vec!["b-0".to_string(), "c-0".to_string()]);
        assert!((layout.used_length_in - 30.4).abs() < EPS);
    }

    #[test]
    fn test_wrap_before_stop_moves_the_cursor() {
        // Second item wraps to y = 0.15 + 30 + 0.1 = 30.25, then fails the
        // length check; the wrapped row start is kept.
        let items = vec![item("a", 22.0, 30.0), item("b", 22.0, 30.0)];
        let layout = pack(&items, &SheetConfig::default()).unwrap();

        assert_eq!(layout.placements.len(), 1);
        assert!((layout.cursor.x_in - 0.15).abs() < EPS);
        assert!((layout.cursor.y_in - 30.25).abs() < EPS);
        assert_eq!(layout.cursor.row_height_in, 0.0);
        assert!((layout.used_length_in - 30.4).abs() < EPS);
    }

    #[test]
    fn test_skips_items_without_source_before_taking_space() {
        let mut missing = item("ghost", 20.0, 20.0);
        missing.source_key = None;
        let items = vec![missing, item("a", 5.0, 5.0)];

        let layout = pack(&items, &SheetConfig::default()).unwrap();
        assert_eq!(layout.skipped, vec!["ghost-0".to_string()]);
        assert!((layout.placements[0].x_in - 0.15).abs() < EPS);
        assert!((layout.placements[0].y_in - 0.15).abs() < EPS);
    }

    #[test]
    fn test_oversized_items_are_never_placed() {
        let items = vec![item("wide", 22.3, 2.0), item("a", 5.0, 1.0)];
        let layout = pack(&items, &SheetConfig::default()).unwrap();

        assert_eq!(layout.oversized, vec!["wide-0".to_string()]);
        assert_eq!(layout.placements.len(), 1);
        assert_eq!(layout.placements[0].item_id, "a");
        assert!((layout.placements[0].y_in - 0.15).abs() < EPS);
    }

    #[test]
    fn test_nothing_placed() {
        assert_eq!(
            pack(&[], &SheetConfig::default()),
            Err(PackError::NothingPlaced { considered: 0 })
        );

        let too_tall = vec![item("tall", 5.0, 100.0)];
        assert_eq!(
            pack(&too_tall, &SheetConfig::default()),
            Err(PackError::NothingPlaced { considered: 1 })
        );
    }

    #[test]
    fn test_sort_for_packing() {
        let mut items = vec![
            PackItem {
                label: "b-0".into(),
                ..item("b", 1.0, 5.0)
            },
            PackItem {
                label: "a-1".into(),
                ..item("a", 1.0, 5.0)
            },
            item("c", 1.0, 9.0),
            PackItem {
                label: "a-0".into(),
                ..item("a", 1.0, 5.0)
            },
        ];
        sort_for_packing(&mut items);

        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["c-0", "a-0", "a-1", "b-0"]);
    }

    #[test]
    fn test_deterministic() {
        let items: Vec<PackItem> = (0..40)
            .map(|i| item(&format!("i{i}"), 1.0 + (i % 7) as f64, 1.0 + (i % 5) as f64))
            .collect();
        let first = pack(&items, &SheetConfig::default()).unwrap();
        let second = pack(&items, &SheetConfig::default()).unwrap();
        assert_eq!(first, second);
    }

    fn arb_items() -> impl Strategy<Value = Vec<PackItem>> {
        prop::collection::vec((0.5f64..30.0, 0.5f64..30.0, any::<bool>()), 0..60).prop_map(|dims| {
            dims.into_iter()
                .enumerate()
                .map(|(i, (w, h, has_source))| PackItem {
                    item_id: format!("i{i}"),
                    label: format!("i{i}-0"),
                    width_in: w,
                    height_in: h,
                    source_key: has_source.then(|| format!("k{i}")),
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_layout_stays_on_sheet(mut items in arb_items()) {
            let config = SheetConfig::default();
            sort_for_packing(&mut items);

            match pack(&items, &config) {
                Ok(layout) => {
                    prop_assert!(layout.used_length_in <= config.max_length_in);
                    for p in &layout.placements {
                        prop_assert!(p.x_in >= 0.0);
                        prop_assert!(p.right_in() <= config.sheet_width_in - config.margin_in + EPS);
                        prop_assert!(p.bottom_in() <= config.max_length_in - config.margin_in + EPS);
                        prop_assert!(p.width_in <= config.printable_width_in() + EPS);
                        prop_assert_eq!(p.rotation_deg, 0);
                    }
                    for (i, a) in layout.placements.iter().enumerate() {
                        for b in &layout.placements[i + 1..] {
                            prop_assert!(!a.overlaps(b));
                        }
                    }
                    let accounted = layout.placements.len()
                        + layout.skipped.len()
                        + layout.oversized.len()
                        + layout.unplaced.len();
                    prop_assert_eq!(accounted, items.len());
                }
                Err(PackError::NothingPlaced { considered }) => {
                    prop_assert_eq!(considered, items.len());
                }
            }
        }
    }
}
