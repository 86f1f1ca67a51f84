//! Pixel geometry for compositing a planned sheet.
//!
//! Inches become pixels as `round(inches × dpi)`. Every layer is resized to
//! fill its box exactly; aspect ratio is the customer's responsibility.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::assembly::BatchPlan;

/// Print resolution used when none is configured.
pub const DEFAULT_DPI: u32 = 300;

/// Converts a length in inches to whole pixels.
#[inline]
pub fn inches_to_px(inches: f64, dpi: u32) -> u32 {
    (inches * f64::from(dpi)).round().max(0.0) as u32
}

/// One source image, positioned and sized on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RasterLayer {
    pub item_id: String,
    pub source_key: String,
    pub left_px: u32,
    pub top_px: u32,
    pub width_px: u32,
    pub height_px: u32,
}

/// Canvas size plus the layers to draw on it, in placement order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RasterPlan {
    pub dpi: u32,
    pub canvas_width_px: u32,
    pub canvas_height_px: u32,
    pub layers: Vec<RasterLayer>,
}

impl RasterPlan {
    /// Lays out a transparent canvas `sheet_width × used_length`.
    ///
    /// ## Example
    /// ```rust
    /// use gangsheet_core::assembly::{plan_batch, BatchFilter};
    /// use gangsheet_core::raster::{RasterPlan, DEFAULT_DPI};
    /// use gangsheet_core::{QueueItem, SheetConfig};
    ///
    /// let queue = vec![QueueItem {
    ///     id: "oi-1".into(),
    ///     order_id: "o-1".into(),
    ///     width_in: 5.0,
    ///     height_in: 10.0,
    ///     qty: 1,
    ///     source_key: Some("uploads/a.png".into()),
    /// }];
    /// let config = SheetConfig::default();
    /// let plan = plan_batch(&queue, &BatchFilter::All, &config).unwrap();
    ///
    /// let raster = RasterPlan::from_plan(&plan, config.sheet_width_in, DEFAULT_DPI);
    /// assert_eq!(raster.canvas_width_px, 6750);
    /// assert_eq!(raster.canvas_height_px, 3090);
    /// ```
    pub fn from_plan(plan: &BatchPlan, sheet_width_in: f64, dpi: u32) -> Self {
        let layers = plan
            .placements
            .iter()
            .map(|planned| {
                let p = &planned.placement;
                RasterLayer {
                    item_id: p.item_id.clone(),
                    source_key: planned.source_key.clone(),
                    left_px: inches_to_px(p.x_in, dpi),
                    top_px: inches_to_px(p.y_in, dpi),
                    width_px: inches_to_px(p.width_in, dpi),
                    height_px: inches_to_px(p.height_in, dpi),
                }
            })
            .collect();

        RasterPlan {
            dpi,
            canvas_width_px: inches_to_px(sheet_width_in, dpi),
            canvas_height_px: inches_to_px(plan.used_length_in, dpi),
            layers,
        }
    }

    /// Distinct source keys, first-seen order.
    pub fn source_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for layer in &self.layers {
            if !keys.contains(&layer.source_key.as_str()) {
                keys.push(layer.source_key.as_str());
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::PlannedPlacement;
    use crate::types::Placement;

    fn plan_with(placements: Vec<(&str, f64, f64, f64, f64)>, used: f64) -> BatchPlan {
        BatchPlan {
            placements: placements
                .into_iter()
                .map(|(id, x, y, w, h)| PlannedPlacement {
                    placement: Placement {
                        item_id: id.to_string(),
                        x_in: x,
                        y_in: y,
                        width_in: w,
                        height_in: h,
                        rotation_deg: 0,
                    },
                    source_key: format!("uploads/{id}.png"),
                })
                .collect(),
            used_length_in: used,
            claims: vec![],
            unplaced_labels: vec![],
            skipped_labels: vec![],
            oversized_labels: vec![],
        }
    }

    #[test]
    fn test_pixel_math_at_300_dpi() {
        let plan = plan_with(vec![("a", 0.15, 0.15, 5.0, 10.0), ("b", 5.25, 0.15, 2.5, 1.0)], 10.3);
        let raster = RasterPlan::from_plan(&plan, 22.5, DEFAULT_DPI);

        assert_eq!(raster.canvas_width_px, 6750);
        assert_eq!(raster.canvas_height_px, 3090);
        assert_eq!(
            raster.layers[0],
            RasterLayer {
                item_id: "a".into(),
                source_key: "uploads/a.png".into(),
                left_px: 45,
                top_px: 45,
                width_px: 1500,
                height_px: 3000,
            }
        );
        assert_eq!(raster.layers[1].left_px, 1575);
        assert_eq!(raster.layers[1].width_px, 750);
    }

    #[test]
    fn test_other_dpi() {
        let plan = plan_with(vec![("a", 0.15, 0.15, 1.0, 1.0)], 1.3);
        let raster = RasterPlan::from_plan(&plan, 22.5, 150);
        assert_eq!(raster.canvas_width_px, 3375);
        assert_eq!(raster.canvas_height_px, 195);
        assert_eq!(raster.layers[0].width_px, 150);
    }

    #[test]
    fn test_source_keys_deduplicated() {
        let plan = plan_with(
            vec![("a", 0.15, 0.15, 1.0, 1.0), ("a", 1.25, 0.15, 1.0, 1.0), ("b", 2.35, 0.15, 1.0, 1.0)],
            1.3,
        );
        let raster = RasterPlan::from_plan(&plan, 22.5, DEFAULT_DPI);
        assert_eq!(raster.source_keys(), vec!["uploads/a.png", "uploads/b.png"]);
    }
}
