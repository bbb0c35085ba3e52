use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage, imageops};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{FundusError, Result},
    types::SegmentedImage,
};

/// Spacing and background of the side-by-side grid
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct GridLayout {
    /// Pixels between cells and around the border
    pub gutter: u32,
    pub background: [u8; 3],
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            gutter: 8,
            background: [32, 32, 32],
        }
    }
}

/// Two columns, one row per pair: the original in color on the left and
/// its mask on the right. Every cell is sized to the largest image.
pub fn render_grid(pairs: &[SegmentedImage], layout: &GridLayout) -> Result<RgbImage> {
    if pairs.is_empty() {
        return Err(FundusError::EmptyGrid);
    }

    let cell_w = pairs.iter().map(|p| p.original.width()).max().unwrap_or(0);
    let cell_h = pairs.iter().map(|p| p.original.height()).max().unwrap_or(0);
    let gutter = layout.gutter;
    let rows = pairs.len() as u32;

    let width = 2 * cell_w + 3 * gutter;
    let height = rows * cell_h + (rows + 1) * gutter;
    let mut canvas = RgbImage::from_pixel(width, height, Rgb(layout.background));

    for (row, pair) in pairs.iter().enumerate() {
        let y = (gutter + row as u32 * (cell_h + gutter)) as i64;
        imageops::replace(&mut canvas, &pair.original, gutter as i64, y);

        let mask_rgb = DynamicImage::ImageLuma8(pair.mask.as_image().clone()).to_rgb8();
        imageops::replace(&mut canvas, &mask_rgb, (2 * gutter + cell_w) as i64, y);
    }

    Ok(canvas)
}

/// Render the grid and write it to `path`; the format follows the extension
pub fn save_grid(pairs: &[SegmentedImage], layout: &GridLayout, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let grid = render_grid(pairs, layout)?;
    grid.save(path)?;
    info!(
        "Wrote {}x{} grid of {} image(s) to {}",
        grid.width(),
        grid.height(),
        pairs.len(),
        path.display()
    );
    Ok(())
}
