use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{DynamicImage, ImageError, ImageReader};
use tracing::{debug, info};

use crate::{
    error::{LoadError, Result},
    types::SegmentedImage,
};

/// File name suffixes the batch driver accepts
pub const SUPPORTED_SUFFIXES: [&str; 2] = [".jpg", ".png"];

/// Decode the image at `path`.
///
/// The format is sniffed from the file contents, falling back to the
/// extension, so a JPEG saved under a `.png` name still loads.
///
/// Fails with [`LoadError`] when the file is missing, unreadable, not a
/// decodable image, or decodes to zero pixels.
pub fn load_image(path: impl AsRef<Path>) -> std::result::Result<DynamicImage, LoadError> {
    let path = path.as_ref();
    let decode_error = |source: ImageError| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    };
    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| decode_error(ImageError::IoError(e)))?
        .decode()
        .map_err(decode_error)?;

    if image.width() == 0 || image.height() == 0 {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );
    Ok(image)
}

/// True if the file name ends in one of `suffixes` (case-sensitive)
pub fn has_suffix(path: &Path, suffixes: &[impl AsRef<str>]) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| suffixes.iter().any(|s| name.ends_with(s.as_ref())))
}

/// True if the file name ends in `.jpg` or `.png`
pub fn is_supported_image(path: impl AsRef<Path>) -> bool {
    has_suffix(path.as_ref(), SUPPORTED_SUFFIXES.as_slice())
}

/// Write every mask as `<stem>_mask.png` into `dir`, creating it if needed
pub fn save_masks(pairs: &[SegmentedImage], dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let path = dir.join(format!("{}_mask.png", pair.stem()));
        pair.mask.as_image().save(&path)?;
        written.push(path);
    }
    info!("Saved {} mask(s) to {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_load_error() {
        let err = load_image("does/not/exist.png").unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
        assert_eq!(err.path(), Path::new("does/not/exist.png"));
    }

    #[test]
    fn test_suffix_match_is_case_sensitive() {
        assert!(is_supported_image("a/10.png"));
        assert!(is_supported_image("b.jpg"));
        assert!(!is_supported_image("c.JPG"));
        assert!(!is_supported_image("d.jpeg"));
        assert!(!is_supported_image("notes.txt"));
        assert!(!is_supported_image("png"));
    }

    #[test]
    fn test_round_trip_through_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("small.png");
        image::RgbImage::from_pixel(7, 5, image::Rgb([10, 20, 30]))
            .save(&path)
            .expect("save png");

        let loaded = load_image(&path).expect("load png");
        assert_eq!((loaded.width(), loaded.height()), (7, 5));
    }

    #[test]
    fn test_format_is_detected_from_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let jpeg = dir.path().join("photo.jpg");
        image::RgbImage::from_pixel(9, 6, image::Rgb([120, 60, 30]))
            .save(&jpeg)
            .expect("save jpeg");
        let misnamed = dir.path().join("photo.png");
        fs::copy(&jpeg, &misnamed).expect("copy");

        let loaded = load_image(&misnamed).expect("jpeg bytes under a .png name");
        assert_eq!((loaded.width(), loaded.height()), (9, 6));
    }

    #[test]
    fn test_truncated_file_is_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.png");
        fs::write(&path, b"\x89PNG\r\n\x1a\n truncated").expect("write");
        assert!(matches!(load_image(&path), Err(LoadError::Decode { .. })));
    }

    #[test]
    fn test_save_masks_names_by_stem() {
        use crate::types::VesselMask;

        let dir = tempfile::tempdir().expect("tempdir");
        let mask = VesselMask::from_binary(image::GrayImage::new(3, 3)).expect("binary");
        let pair = SegmentedImage::new("in/07.jpg", image::RgbImage::new(3, 3), mask);

        let written = save_masks(&[pair], dir.path().join("masks")).expect("save");
        assert_eq!(written, vec![dir.path().join("masks").join("07_mask.png")]);
        assert!(written[0].is_file());
    }
}
