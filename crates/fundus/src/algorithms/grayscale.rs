use image::{DynamicImage, GrayImage, Luma, Rgb};
use imageproc::map::map_colors;

/// BT.601 luma in 14-bit fixed point, rounded.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    ((r as u32 * R + g as u32 * G + b as u32 * B + (1 << 13)) >> 14) as u8
}

/// Single-channel view of a decoded image. 8-bit grayscale input is copied
/// through unchanged; everything else is weighted by [`luminance`].
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => {
            let rgb = other.to_rgb8();
            map_colors(&rgb, |Rgb([r, g, b]): Rgb<u8>| Luma([luminance(r, g, b)]))
        }
    }
}
