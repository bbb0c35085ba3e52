pub mod builder;

use std::path::Path;

use image::{DynamicImage, GrayImage};
use tracing::debug;

use crate::{
    algorithms::to_grayscale,
    error::LoadError,
    io::load_image,
    traits::{ImageFilter, VesselSegmenter},
    types::{SegmentedImage, VesselMask},
};

/// Loader -> preprocessor -> segmenter
pub struct Pipeline {
    filters: Vec<Box<dyn ImageFilter>>,
    segmenter: Box<dyn VesselSegmenter>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    pub fn new(filters: Vec<Box<dyn ImageFilter>>, segmenter: Box<dyn VesselSegmenter>) -> Self {
        Self { filters, segmenter }
    }

    /// Grayscale conversion followed by every filter in order.
    /// The result has the dimensions of `image`.
    pub fn preprocess(&self, image: &DynamicImage) -> GrayImage {
        let gray = to_grayscale(image);
        self.filters.iter().fold(gray, |current, filter| {
            let out = filter.apply(&current);
            debug_assert_eq!(out.dimensions(), current.dimensions(), "{} resized", filter.name());
            out
        })
    }

    /// Segment an already preprocessed grayscale image
    pub fn segment(&self, preprocessed: &GrayImage) -> VesselMask {
        self.segmenter.segment(preprocessed)
    }

    /// Preprocess and segment a decoded image
    pub fn process(&self, image: &DynamicImage) -> VesselMask {
        let mask = self.segment(&self.preprocess(image));
        debug_assert_eq!(mask.dimensions(), (image.width(), image.height()));
        mask
    }

    /// Load the file at `path` and segment it. Nothing past the loader runs
    /// if loading fails.
    pub fn extract(&self, path: impl AsRef<Path>) -> Result<SegmentedImage, LoadError> {
        let path = path.as_ref();
        let image = load_image(path)?;
        let mask = self.process(&image);
        debug!(
            "Segmented {}: {:.2}% vessel coverage",
            path.display(),
            mask.coverage() * 100.0
        );
        Ok(SegmentedImage::new(path, image.to_rgb8(), mask))
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        let stages: Vec<&str> = self.filters.iter().map(|f| f.name()).collect();
        format!(
            "Pipeline: grayscale -> {} -> segmenter",
            if stages.is_empty() { "(no filters)".to_string() } else { stages.join(" -> ") }
        )
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        builder::PipelineBuilder::vessel_default()
    }
}
