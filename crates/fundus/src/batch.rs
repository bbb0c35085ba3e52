use std::{fs, path::PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::BatchConfig,
    error::{LoadError, Result},
    io::is_supported_image,
    pipeline::Pipeline,
    types::SegmentedImage,
};

/// A file that matched the extension filter but could not be loaded
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: LoadError,
}

/// Outcome of one pass over the input directory
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully segmented images, in discovery order
    pub processed: Vec<SegmentedImage>,
    pub failures: Vec<BatchFailure>,
    /// Entries ignored because of their name or type
    pub skipped: usize,
}

/// Counts and per-file details suitable for printing as JSON
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub images: Vec<ImageSummary>,
    pub failures: Vec<FailureSummary>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageSummary {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub vessel_coverage: f32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailureSummary {
    pub path: PathBuf,
    pub error: String,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            processed: self.processed.len(),
            failed: self.failures.len(),
            skipped: self.skipped,
            images: self
                .processed
                .iter()
                .map(|s| ImageSummary {
                    path: s.path.clone(),
                    width: s.mask.width(),
                    height: s.mask.height(),
                    vessel_coverage: s.mask.coverage(),
                })
                .collect(),
            failures: self
                .failures
                .iter()
                .map(|f| FailureSummary {
                    path: f.path.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Runs the pipeline over every accepted file of a directory
pub struct BatchDriver {
    config: BatchConfig,
    pipeline: Pipeline,
}

impl BatchDriver {
    pub fn new(config: BatchConfig, pipeline: Pipeline) -> Self {
        Self { config, pipeline }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Process the configured directory. A file that fails to load is
    /// logged and recorded in the report; only an unreadable directory
    /// aborts the run.
    pub fn run(&self) -> Result<BatchReport> {
        let dir = &self.config.input_dir;
        info!("Scanning {} ({})", dir.display(), self.pipeline.info());

        let mut entries = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        let mut report = BatchReport::default();
        for path in entries {
            if !is_supported_image(&path) {
                debug!("Skipping {}: unsupported name", path.display());
                report.skipped += 1;
                continue;
            }
            if path.is_dir() {
                debug!("Skipping {}: directory", path.display());
                report.skipped += 1;
                continue;
            }

            match self.pipeline.extract(&path) {
                Ok(segmented) => {
                    info!(
                        "Processed {} ({}x{}, {:.2}% vessels)",
                        path.display(),
                        segmented.mask.width(),
                        segmented.mask.height(),
                        segmented.mask.coverage() * 100.0
                    );
                    report.processed.push(segmented);
                }
                Err(error) => {
                    warn!("{error}");
                    report.failures.push(BatchFailure { path, error });
                }
            }
        }

        info!(
            "Batch finished: {} processed, {} failed, {} skipped",
            report.processed.len(),
            report.failures.len(),
            report.skipped
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FundusError;

    #[test]
    fn test_missing_directory_is_io_error() {
        let driver = BatchDriver::new(BatchConfig::new("no/such/dir"), Pipeline::default());
        assert!(matches!(driver.run(), Err(FundusError::Io(_))));
    }

    #[test]
    fn test_empty_directory_yields_empty_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        let driver = BatchDriver::new(BatchConfig::new(dir.path()), Pipeline::default());
        let report = driver.run().expect("run");
        assert!(report.processed.is_empty());
        assert!(report.failures.is_empty());
        assert_eq!(report.summary().processed, 0);
    }

    #[test]
    fn test_directory_named_like_image_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("folder.png")).expect("mkdir");
        let driver = BatchDriver::new(BatchConfig::new(dir.path()), Pipeline::default());
        let report = driver.run().expect("run");
        assert_eq!(report.skipped, 1);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_only_jpg_and_png_names_are_attempted() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["scan.tif", "scan.bmp", "scan.jpeg", "scan.PNG"] {
            fs::write(dir.path().join(name), b"not an image").expect("write");
        }
        let driver = BatchDriver::new(BatchConfig::new(dir.path()), Pipeline::default());
        let report = driver.run().expect("run");
        assert_eq!(report.skipped, 4);
        assert!(report.failures.is_empty());
    }
}
