use std::path::{Path, PathBuf};

use image::{GrayImage, RgbImage};

/// Foreground sample value of a vessel mask
pub const FOREGROUND: u8 = 255;
/// Background sample value of a vessel mask
pub const BACKGROUND: u8 = 0;

/// Binary vessel mask. Every sample is either [`FOREGROUND`] or [`BACKGROUND`].
#[derive(Debug, Clone, PartialEq)]
pub struct VesselMask(GrayImage);

impl VesselMask {
    /// Wrap an image that is already binary, returning `None` if any sample
    /// is outside {0, 255}.
    pub fn from_binary(image: GrayImage) -> Option<Self> {
        if image.pixels().all(|p| p[0] == FOREGROUND || p[0] == BACKGROUND) {
            Some(Self(image))
        } else {
            None
        }
    }

    /// Wrap an image produced by a binary operation without re-checking it.
    pub(crate) fn from_binary_unchecked(image: GrayImage) -> Self {
        debug_assert!(image.pixels().all(|p| p[0] == FOREGROUND || p[0] == BACKGROUND));
        Self(image)
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// Number of foreground pixels
    pub fn foreground_count(&self) -> usize {
        self.0.pixels().filter(|p| p[0] == FOREGROUND).count()
    }

    /// Fraction of the image covered by foreground, in [0, 1]
    pub fn coverage(&self) -> f32 {
        let total = self.0.width() as usize * self.0.height() as usize;
        if total == 0 {
            return 0.0;
        }
        self.foreground_count() as f32 / total as f32
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_image(self) -> GrayImage {
        self.0
    }
}

impl AsRef<GrayImage> for VesselMask {
    fn as_ref(&self) -> &GrayImage {
        &self.0
    }
}

/// An original fundus image paired with the mask segmented from it
#[derive(Debug, Clone)]
pub struct SegmentedImage {
    /// File the original was loaded from
    pub path: PathBuf,
    pub original: RgbImage,
    pub mask: VesselMask,
}

impl SegmentedImage {
    pub fn new(path: impl Into<PathBuf>, original: RgbImage, mask: VesselMask) -> Self {
        debug_assert_eq!(original.dimensions(), mask.dimensions());
        Self {
            path: path.into(),
            original,
            mask,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem used to name exported artefacts, `image` if the path has none
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_from_binary_rejects_gray_levels() {
        let mut img = GrayImage::new(4, 4);
        img.put_pixel(1, 1, Luma([128u8]));
        assert!(VesselMask::from_binary(img).is_none());
    }

    #[test]
    fn test_coverage() {
        let mut img = GrayImage::new(4, 4);
        for x in 0..4 {
            img.put_pixel(x, 0, Luma([FOREGROUND]));
        }
        let mask = VesselMask::from_binary(img).expect("binary image");
        assert_eq!(mask.foreground_count(), 4);
        assert!((mask.coverage() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_stem_from_path() {
        let mask = VesselMask::from_binary(GrayImage::new(2, 2)).expect("binary image");
        let pair = SegmentedImage::new("input/10.png", RgbImage::new(2, 2), mask);
        assert_eq!(pair.stem(), "10");
    }
}
