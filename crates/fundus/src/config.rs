use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{FundusError, Result};

/// Folder scanned when no input directory is configured
pub const DEFAULT_INPUT_DIR: &str = "EyeFundus_input";

/// Parameters of the grayscale preprocessing chain
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Side of the square Gaussian blur kernel (odd)
    pub blur_kernel_size: u32,
    /// Spatial standard deviation of the blur kernel
    pub blur_sigma: f32,
    /// Number of CLAHE tiles along x
    pub clahe_tiles_x: u32,
    /// Number of CLAHE tiles along y
    pub clahe_tiles_y: u32,
    /// CLAHE contrast clip limit, relative to a uniform histogram
    pub clahe_clip_limit: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            blur_sigma: 5.0,
            clahe_tiles_x: 8,
            clahe_tiles_y: 8,
            clahe_clip_limit: 0.2,
        }
    }
}

/// Parameters of the adaptive threshold. The morphological refinement
/// that follows it is fixed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct SegmentConfig {
    /// Side of the square neighbourhood used for the local mean (odd)
    pub block_size: u32,
    /// Constant subtracted from the local mean
    pub offset: f32,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            block_size: 11,
            offset: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub preprocess: PreprocessConfig,
    pub segment: SegmentConfig,
}

impl PipelineConfig {
    /// Check parameter ranges once, before any image is processed
    pub fn validate(&self) -> Result<()> {
        let p = &self.preprocess;
        check_odd_kernel("blur_kernel_size", p.blur_kernel_size)?;
        if !(p.blur_sigma.is_finite() && p.blur_sigma > 0.0) {
            return Err(FundusError::InvalidConfig(format!(
                "blur_sigma must be positive, got {}",
                p.blur_sigma
            )));
        }
        if p.clahe_tiles_x == 0 || p.clahe_tiles_y == 0 {
            return Err(FundusError::InvalidConfig(format!(
                "CLAHE tile grid must be non-empty, got {}x{}",
                p.clahe_tiles_x, p.clahe_tiles_y
            )));
        }
        if !(p.clahe_clip_limit.is_finite() && p.clahe_clip_limit >= 0.0) {
            return Err(FundusError::InvalidConfig(format!(
                "clahe_clip_limit must be non-negative, got {}",
                p.clahe_clip_limit
            )));
        }
        check_odd_kernel("block_size", self.segment.block_size)?;
        if !self.segment.offset.is_finite() {
            return Err(FundusError::InvalidConfig("offset must be finite".into()));
        }
        Ok(())
    }
}

fn check_odd_kernel(name: &str, size: u32) -> Result<()> {
    if size < 3 || size % 2 == 0 {
        return Err(FundusError::InvalidConfig(format!(
            "{name} must be odd and at least 3, got {size}"
        )));
    }
    Ok(())
}

/// Where the batch driver looks for images. Accepted names are fixed, see
/// [`crate::io::is_supported_image`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
        }
    }
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        PipelineConfig::default().validate().expect("defaults should validate");
    }

    #[test]
    fn test_even_block_size_rejected() {
        let mut config = PipelineConfig::default();
        config.segment.block_size = 10;
        assert!(matches!(config.validate(), Err(FundusError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_tiles_rejected() {
        let mut config = PipelineConfig::default();
        config.preprocess.clahe_tiles_y = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "segment": { "offset": 3.0 } }"#).expect("valid json");
        assert_eq!(config.segment.offset, 3.0);
        assert_eq!(config.segment.block_size, 11);
        assert_eq!(config.preprocess, PreprocessConfig::default());
    }
}
