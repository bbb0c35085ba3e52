use image::GrayImage;

use crate::types::VesselMask;

/// A single grayscale-to-grayscale step of the preprocessing chain
pub trait ImageFilter: Send + Sync {
    /// Short name used in logs and `Pipeline::info`
    fn name(&self) -> &'static str;

    /// Apply the filter. Output has the same dimensions as the input.
    fn apply(&self, image: &GrayImage) -> GrayImage;
}

/// Turns a grayscale image into a binary image (samples in {0, 255})
pub trait Binarizer: Send + Sync {
    fn binarize(&self, image: &GrayImage) -> GrayImage;
}

/// A refinement pass over a binary image
pub trait BinaryRefiner: Send + Sync {
    fn refine(&self, binary: GrayImage) -> GrayImage;
}

/// Full segmentation of a preprocessed image into a vessel mask
pub trait VesselSegmenter: Send + Sync {
    fn segment(&self, image: &GrayImage) -> VesselMask;
}
