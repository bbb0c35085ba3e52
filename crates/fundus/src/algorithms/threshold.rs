use image::{GrayImage, Luma};
use imageproc::map::map_colors2;

use crate::{
    algorithms::blur::{gaussian_kernel, separable_filter_f32},
    traits::Binarizer,
    types::{BACKGROUND, FOREGROUND},
};

/// Inverted adaptive threshold against a Gaussian-weighted local mean.
///
/// A pixel becomes foreground when it is at least `offset` darker than the
/// weighted mean of its `block_size` × `block_size` neighbourhood, so dark
/// vessels on a bright fundus come out white.
#[derive(Debug, Clone)]
pub struct AdaptiveGaussianThreshold {
    pub block_size: u32,
    pub offset: f32,
}

impl Default for AdaptiveGaussianThreshold {
    fn default() -> Self {
        Self {
            block_size: 11,
            offset: 2.0,
        }
    }
}

impl Binarizer for AdaptiveGaussianThreshold {
    fn binarize(&self, image: &GrayImage) -> GrayImage {
        let kernel = gaussian_kernel(self.block_size, 0.0);
        let local_mean = separable_filter_f32(image, kernel.as_slice());
        let delta = self.offset.floor() as i32;

        // the mean is rounded to the nearest 8-bit level before comparing
        map_colors2(image, &local_mean, |p: Luma<u8>, m: Luma<f32>| {
            let mean = m[0].round().clamp(0.0, 255.0) as i32;
            if p[0] as i32 - mean <= -delta {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        })
    }
}
