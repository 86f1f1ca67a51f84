//! PNG compositing of a [`RasterPlan`] with the `image` crate.
//!
//! Each source is decoded once, resized to exactly its layer box (fill, no
//! aspect preservation) and laid over a transparent canvas. Decoding and
//! resizing run on the blocking pool.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Cursor;

use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::debug;

use gangsheet_core::raster::RasterPlan;

use crate::collaborators::Compositor;
use crate::error::{BatchError, BatchResult};

/// Renders sheets as RGBA PNGs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCompositor;

#[async_trait]
impl Compositor for PngCompositor {
    async fn composite(
        &self,
        plan: &RasterPlan,
        sources: &HashMap<String, Vec<u8>>,
    ) -> BatchResult<Vec<u8>> {
        let plan = plan.clone();
        let sources = sources.clone();
        tokio::task::spawn_blocking(move || render_sheet(&plan, &sources))
            .await
            .map_err(|e| BatchError::Image(format!("Compositing task failed: {e}")))?
    }
}

/// Draws every layer of `plan` and encodes the canvas as PNG.
pub fn render_sheet(plan: &RasterPlan, sources: &HashMap<String, Vec<u8>>) -> BatchResult<Vec<u8>> {
    let mut canvas = RgbaImage::new(plan.canvas_width_px, plan.canvas_height_px);
    let mut decoded: HashMap<&str, DynamicImage> = HashMap::new();

    for layer in &plan.layers {
        if layer.width_px == 0 || layer.height_px == 0 {
            continue;
        }

        let source = match decoded.entry(layer.source_key.as_str()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let bytes = sources
                    .get(layer.source_key.as_str())
                    .ok_or_else(|| BatchError::ObjectNotFound(layer.source_key.clone()))?;
                entry.insert(image::load_from_memory(bytes)?)
            }
        };

        let resized = source
            .resize_exact(layer.width_px, layer.height_px, FilterType::Triangle)
            .to_rgba8();
        imageops::overlay(
            &mut canvas,
            &resized,
            i64::from(layer.left_px),
            i64::from(layer.top_px),
        );
    }

    debug!(
        width_px = plan.canvas_width_px,
        height_px = plan.canvas_height_px,
        layers = plan.layers.len(),
        "Encoding sheet"
    );

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(canvas).write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gangsheet_core::raster::RasterLayer;
    use image::{GenericImageView, Rgba};

    fn solid_png(color: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(3, 2, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut out, ImageFormat::Png)
            .expect("encode test image");
        out.into_inner()
    }

    fn layer(key: &str, left_px: u32, width_px: u32) -> RasterLayer {
        RasterLayer {
            item_id: key.to_string(),
            source_key: key.to_string(),
            left_px,
            top_px: 2,
            width_px,
            height_px: 4,
        }
    }

    #[test]
    fn test_render_sheet_places_layers() {
        let plan = RasterPlan {
            dpi: 10,
            canvas_width_px: 20,
            canvas_height_px: 8,
            layers: vec![layer("red", 2, 5), layer("blue", 9, 6)],
        };
        let sources = HashMap::from([
            ("red".to_string(), solid_png([255, 0, 0, 255])),
            ("blue".to_string(), solid_png([0, 0, 255, 255])),
        ]);

        let png = render_sheet(&plan, &sources).unwrap();
        let sheet = image::load_from_memory(&png).expect("decode sheet");

        assert_eq!(sheet.dimensions(), (20, 8));
        assert_eq!(sheet.get_pixel(4, 3), Rgba([255, 0, 0, 255]));
        assert_eq!(sheet.get_pixel(12, 5), Rgba([0, 0, 255, 255]));
        // Spacing and margins stay transparent.
        assert_eq!(sheet.get_pixel(8, 3)[3], 0);
        assert_eq!(sheet.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_render_sheet_missing_source() {
        let plan = RasterPlan {
            dpi: 10,
            canvas_width_px: 10,
            canvas_height_px: 10,
            layers: vec![layer("gone", 0, 2)],
        };
        assert!(matches!(
            render_sheet(&plan, &HashMap::new()),
            Err(BatchError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_render_sheet_rejects_garbage() {
        let plan = RasterPlan {
            dpi: 10,
            canvas_width_px: 10,
            canvas_height_px: 10,
            layers: vec![layer("junk", 0, 2)],
        };
        let sources = HashMap::from([("junk".to_string(), b"not an image".to_vec())]);
        assert!(matches!(render_sheet(&plan, &sources), Err(BatchError::Image(_))));
    }

    #[tokio::test]
    async fn test_compositor_trait() {
        let plan = RasterPlan {
            dpi: 10,
            canvas_width_px: 4,
            canvas_height_px: 4,
            layers: vec![],
        };
        let png = PngCompositor.composite(&plan, &HashMap::new()).await.unwrap();
        let sheet = image::load_from_memory(&png).expect("decode sheet");
        assert_eq!(sheet.dimensions(), (4, 4));
    }
}
