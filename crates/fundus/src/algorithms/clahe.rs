//! Contrast limited adaptive histogram equalization.
//!
//! The image is divided into a `tiles_x` × `tiles_y` grid. Each tile gets an
//! equalization lookup table built from its clipped histogram, and every
//! output pixel is the bilinear blend of the four nearest tile tables.
//! Images that do not divide evenly into the grid are extended on the right
//! and bottom by reflection (without repeating the edge sample) so that all
//! tiles share one size.

use image::{GrayImage, Luma};

use crate::traits::ImageFilter;

const BINS: usize = 256;

#[derive(Debug, Clone)]
pub struct Clahe {
    pub tiles_x: u32,
    pub tiles_y: u32,
    /// Histogram clip limit relative to a uniform distribution.
    /// Zero disables clipping (plain tiled equalization).
    pub clip_limit: f32,
}

impl Default for Clahe {
    fn default() -> Self {
        Self {
            tiles_x: 8,
            tiles_y: 8,
            clip_limit: 0.2,
        }
    }
}

impl ImageFilter for Clahe {
    fn name(&self) -> &'static str {
        "clahe"
    }

    fn apply(&self, image: &GrayImage) -> GrayImage {
        clahe(image, self.tiles_x, self.tiles_y, self.clip_limit)
    }
}

/// Equalize `image` with a clipped histogram per tile.
pub fn clahe(image: &GrayImage, tiles_x: u32, tiles_y: u32, clip_limit: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || tiles_x == 0 || tiles_y == 0 {
        return image.clone();
    }

    let tile_w = round_up(width, tiles_x) / tiles_x;
    let tile_h = round_up(height, tiles_y) / tiles_y;
    let tile_area = tile_w as usize * tile_h as usize;

    let clip = (clip_limit > 0.0)
        .then(|| ((clip_limit * tile_area as f32 / BINS as f32) as usize).max(1));
    let lut_scale = 255.0 / tile_area as f32;

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0usize; BINS];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect_101(y, height);
                for x in tx * tile_w..(tx + 1) * tile_w {
                    let sx = reflect_101(x, width);
                    hist[image.get_pixel(sx, sy)[0] as usize] += 1;
                }
            }
            if let Some(limit) = clip {
                clip_histogram(&mut hist, limit);
            }
            luts.push(cumulative_lut(&hist, lut_scale));
        }
    }

    let xs: Vec<Neighbours> = (0..width)
        .map(|x| Neighbours::new(x, tile_w, tiles_x))
        .collect();

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let ny = Neighbours::new(y, tile_h, tiles_y);
        let row1 = (ny.lo * tiles_x) as usize;
        let row2 = (ny.hi * tiles_x) as usize;
        for (x, nx) in xs.iter().enumerate() {
            let v = image.get_pixel(x as u32, y)[0] as usize;
            let top = luts[row1 + nx.lo as usize][v] as f32 * (1.0 - nx.frac)
                + luts[row1 + nx.hi as usize][v] as f32 * nx.frac;
            let bottom = luts[row2 + nx.lo as usize][v] as f32 * (1.0 - nx.frac)
                + luts[row2 + nx.hi as usize][v] as f32 * nx.frac;
            let value = top * (1.0 - ny.frac) + bottom * ny.frac;
            out.put_pixel(x as u32, y, Luma([value.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// Indices of the two tiles whose centres bracket a coordinate, and the
/// weight of the second one.
#[derive(Debug, Clone, Copy)]
struct Neighbours {
    lo: u32,
    hi: u32,
    frac: f32,
}

impl Neighbours {
    fn new(coord: u32, tile_size: u32, tiles: u32) -> Self {
        let pos = coord as f32 / tile_size as f32 - 0.5;
        let base = pos.floor();
        let frac = pos - base;
        let lo = (base as i64).max(0) as u32;
        let hi = ((base as i64 + 1).max(0) as u32).min(tiles - 1);
        Self { lo, hi, frac }
    }
}

fn round_up(len: u32, parts: u32) -> u32 {
    match len % parts {
        0 => len,
        r => len + parts - r,
    }
}

/// Mirror an index past the end of `[0, len)` without repeating the edge.
fn reflect_101(i: u32, len: u32) -> u32 {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let r = i % period;
    if r < len { r } else { period - r }
}

/// Cap every bin at `limit` and spread the excess back over all bins.
fn clip_histogram(hist: &mut [usize; BINS], limit: usize) {
    let mut clipped = 0;
    for bin in hist.iter_mut() {
        if *bin > limit {
            clipped += *bin - limit;
            *bin = limit;
        }
    }

    let batch = clipped / BINS;
    let mut residual = clipped - batch * BINS;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (BINS / residual).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

fn cumulative_lut(hist: &[usize; BINS], scale: f32) -> [u8; BINS] {
    let mut lut = [0u8; BINS];
    let mut sum = 0usize;
    for (entry, &count) in lut.iter_mut().zip(hist.iter()) {
        sum += count;
        *entry = (sum as f32 * scale).round().min(255.0) as u8;
    }
    lut
}
