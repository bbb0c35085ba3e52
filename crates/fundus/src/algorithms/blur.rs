use image::{GrayImage, ImageBuffer, Luma};
use imageproc::{filter::separable_filter_equal, map::map_colors};

use crate::traits::ImageFilter;

/// Sampled 1-D Gaussian of odd length `size`, normalized to sum 1.
///
/// A non-positive `sigma` is derived from the size as
/// `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let center = (size as f32 - 1.0) * 0.5;
    let scale = -0.5 / (sigma * sigma);

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}

/// Single-channel float image used for intermediate filter results
pub type GrayImageF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Correlate `image` with the outer product of `kernel` with itself,
/// keeping full precision between the horizontal and vertical passes.
pub fn separable_filter_f32(image: &GrayImage, kernel: &[f32]) -> GrayImageF32 {
    let float: GrayImageF32 = map_colors(image, |p: Luma<u8>| Luma([p[0] as f32]));
    separable_filter_equal(&float, kernel)
}

/// Gaussian smoothing with a fixed square kernel
#[derive(Debug, Clone)]
pub struct GaussianBlur {
    pub kernel_size: u32,
    pub sigma: f32,
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            sigma: 5.0,
        }
    }
}

impl ImageFilter for GaussianBlur {
    fn name(&self) -> &'static str {
        "gaussian_blur"
    }

    fn apply(&self, image: &GrayImage) -> GrayImage {
        let kernel = gaussian_kernel(self.kernel_size, self.sigma);
        let smoothed = separable_filter_f32(image, kernel.as_slice());
        map_colors(&smoothed, |p: Luma<f32>| Luma([p[0].round().clamp(0.0, 255.0) as u8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        for (size, sigma) in [(5, 5.0), (11, 0.0), (3, 1.0)] {
            let k = gaussian_kernel(size, sigma);
            assert_eq!(k.len(), size as usize);
            assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
            for i in 0..k.len() / 2 {
                assert!((k[i] - k[k.len() - 1 - i]).abs() < 1e-6);
            }
            assert!(k[k.len() / 2] >= k[0]);
        }
    }

    #[test]
    fn test_derived_sigma_for_block_11() {
        // sigma 2.0 for an 11-tap kernel
        let derived = gaussian_kernel(11, 0.0);
        let explicit = gaussian_kernel(11, 2.0);
        for (a, b) in derived.iter().zip(&explicit) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_blur_keeps_dimensions_and_spreads_impulse() {
        let mut img = GrayImage::new(21, 15);
        img.put_pixel(10, 7, Luma([255u8]));
        let blurred = GaussianBlur::default().apply(&img);
        assert_eq!(blurred.dimensions(), (21, 15));
        assert!(blurred.get_pixel(10, 7)[0] < 255);
        assert!(blurred.get_pixel(11, 7)[0] > 0);
        assert_eq!(blurred.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_blur_leaves_linear_ramp_unchanged() {
        let ramp = GrayImage::from_fn(17, 9, |x, _| Luma([(x * 10 + 1) as u8]));
        let blurred = GaussianBlur::default().apply(&ramp);
        // columns within two pixels of the edge see the replicated border
        for x in 2..15 {
            for y in 0..9 {
                assert_eq!(blurred.get_pixel(x, y)[0], (x * 10 + 1) as u8, "column {x}");
            }
        }
    }

    #[test]
    fn test_constant_image_survives_blur() {
        let flat = GrayImage::from_pixel(12, 12, Luma([139u8]));
        let blurred = GaussianBlur::default().apply(&flat);
        assert!(blurred.pixels().all(|p| p[0] == 139));
    }
}
