//! # Fundus Vessel Segmentation
//!
//! Extracts an approximate blood-vessel mask from eye-fundus photographs
//! with a fixed classical pipeline:
//!
//! 1. **Load** the image from disk ([`io::load_image`])
//! 2. **Preprocess**: grayscale, 5×5 Gaussian blur (σ = 5), CLAHE on an
//!    8×8 tile grid with clip limit 0.2
//! 3. **Segment**: inverted adaptive Gaussian threshold (block 11, offset 2)
//!    followed by a fixed sequence of morphological passes
//! 4. **Batch**: run the above over a directory and render
//!    (original, mask) pairs side by side
//!
//! The output is a visual aid; it makes no claim to medical accuracy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fundus::Pipeline;
//!
//! let pipeline = Pipeline::default();
//! let segmented = pipeline.extract("EyeFundus_input/10.png")?;
//! assert_eq!(segmented.mask.dimensions(), segmented.original.dimensions());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Batch
//!
//! ```rust,no_run
//! use fundus::{BatchConfig, BatchDriver, GridLayout, Pipeline, save_grid};
//!
//! let driver = BatchDriver::new(BatchConfig::new("EyeFundus_input"), Pipeline::default());
//! let report = driver.run()?;
//! save_grid(&report.processed, &GridLayout::default(), "vessel_grid.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod traits;
pub mod config;
pub mod algorithms;
pub mod pipeline;
pub mod io;
pub mod batch;
pub mod render;

use std::path::Path;

pub use error::{FundusError, LoadError, Result};
pub use types::{SegmentedImage, VesselMask};
pub use traits::*;
pub use config::{BatchConfig, PipelineConfig, PreprocessConfig, SegmentConfig};
pub use algorithms::{DefaultSegmenter, MorphOp, MorphStep, VESSEL_REFINEMENT};
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use io::{is_supported_image, load_image, save_masks};
pub use batch::{BatchDriver, BatchReport, BatchSummary};
pub use render::{GridLayout, render_grid, save_grid};

/// Load, preprocess and segment a single file with the given configuration
pub fn extract_vessels(path: impl AsRef<Path>, config: &PipelineConfig) -> Result<SegmentedImage> {
    let pipeline = PipelineBuilder::from_config(config)?;
    Ok(pipeline.extract(path)?)
}
