pub mod grayscale;
pub mod blur;
pub mod clahe;
pub mod threshold;
pub mod morphology;

pub use grayscale::*;
pub use blur::*;
pub use clahe::*;
pub use threshold::*;
pub use morphology::*;

use image::GrayImage;

use crate::{
    traits::{Binarizer, BinaryRefiner, VesselSegmenter},
    types::VesselMask,
};

/// Segmenter made of a binarization step followed by binary refinement
#[derive(Debug, Clone)]
pub struct ThresholdSegmenter<B, R>
where
    B: Binarizer,
    R: BinaryRefiner,
{
    pub binarizer: B,
    pub refiner: R,
}

impl<B, R> ThresholdSegmenter<B, R>
where
    B: Binarizer,
    R: BinaryRefiner,
{
    pub fn new(binarizer: B, refiner: R) -> Self {
        Self { binarizer, refiner }
    }
}

impl<B, R> VesselSegmenter for ThresholdSegmenter<B, R>
where
    B: Binarizer,
    R: BinaryRefiner,
{
    fn segment(&self, image: &GrayImage) -> VesselMask {
        let binary = self.binarizer.binarize(image);
        VesselMask::from_binary_unchecked(self.refiner.refine(binary))
    }
}

/// Adaptive Gaussian threshold followed by the fixed morphological sequence
pub type DefaultSegmenter = ThresholdSegmenter<AdaptiveGaussianThreshold, MorphologicalRefiner>;

impl Default for DefaultSegmenter {
    fn default() -> Self {
        Self::new(
            AdaptiveGaussianThreshold::default(),
            MorphologicalRefiner::default(),
        )
    }
}
