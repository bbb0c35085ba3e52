use crate::{
    algorithms::{
        AdaptiveGaussianThreshold, Clahe, DefaultSegmenter, GaussianBlur, MorphologicalRefiner,
        ThresholdSegmenter,
    },
    config::PipelineConfig,
    error::Result,
    pipeline::Pipeline,
    traits::{ImageFilter, VesselSegmenter},
};

/// Builder for creating processing pipelines with a fluent API
pub struct PipelineBuilder {
    filters: Vec<Box<dyn ImageFilter>>,
    segmenter: Option<Box<dyn VesselSegmenter>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            segmenter: None,
        }
    }

    /// Add a filter after the ones already added
    pub fn add_filter<F>(mut self, filter: F) -> Self
    where
        F: ImageFilter + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }

    /// Set the segmenter (replaces any existing one)
    pub fn set_segmenter<S>(mut self, segmenter: S) -> Self
    where
        S: VesselSegmenter + 'static,
    {
        self.segmenter = Some(Box::new(segmenter));
        self
    }

    /// Add Gaussian blur with a fixed kernel
    pub fn with_blur(self, kernel_size: u32, sigma: f32) -> Self {
        self.add_filter(GaussianBlur { kernel_size, sigma })
    }

    /// Add CLAHE over a `tiles_x` × `tiles_y` grid
    pub fn with_clahe(self, tiles_x: u32, tiles_y: u32, clip_limit: f32) -> Self {
        self.add_filter(Clahe {
            tiles_x,
            tiles_y,
            clip_limit,
        })
    }

    /// Build the pipeline, defaulting to the vessel segmenter if none was set
    pub fn build(self) -> Pipeline {
        let segmenter = self
            .segmenter
            .unwrap_or_else(|| Box::new(DefaultSegmenter::default()));
        Pipeline::new(self.filters, segmenter)
    }

    /// Validate `config` and build the full vessel pipeline from it
    pub fn from_config(config: &PipelineConfig) -> Result<Pipeline> {
        config.validate()?;
        let p = &config.preprocess;
        let segmenter = ThresholdSegmenter::new(
            AdaptiveGaussianThreshold {
                block_size: config.segment.block_size,
                offset: config.segment.offset,
            },
            MorphologicalRefiner::default(),
        );

        Ok(Self::new()
            .with_blur(p.blur_kernel_size, p.blur_sigma)
            .with_clahe(p.clahe_tiles_x, p.clahe_tiles_y, p.clahe_clip_limit)
            .set_segmenter(segmenter)
            .build())
    }

    /// Blur 5×5 σ=5, CLAHE 8×8 clip 0.2, threshold block 11 offset 2
    pub fn vessel_default() -> Pipeline {
        Self::new()
            .add_filter(GaussianBlur::default())
            .add_filter(Clahe::default())
            .set_segmenter(DefaultSegmenter::default())
            .build()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FundusError;

    #[test]
    fn test_default_pipeline_info() {
        let pipeline = PipelineBuilder::vessel_default();
        assert_eq!(pipeline.info(), "Pipeline: grayscale -> gaussian_blur -> clahe -> segmenter");
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = PipelineConfig::default();
        config.preprocess.blur_kernel_size = 4;
        assert!(matches!(
            PipelineBuilder::from_config(&config),
            Err(FundusError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_builder_has_no_filters() {
        let pipeline = Pipeline::builder().build();
        assert_eq!(pipeline.info(), "Pipeline: grayscale -> (no filters) -> segmenter");
    }
}
