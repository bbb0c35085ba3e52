use std::fs;
use std::path::{Path, PathBuf};

use fundus::{
    BatchConfig, BatchDriver, BatchSummary, FundusError, GridLayout, PipelineBuilder,
    PipelineConfig, save_grid, save_masks,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Grid image written when no output path is given
pub const DEFAULT_GRID_OUTPUT: &str = "vessel_grid.png";

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
    #[error(transparent)]
    Fundus(#[from] FundusError),
}

/// Everything one `segment` run needs, loadable from a TOML or JSON file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct Job {
    /// Path of the rendered (original, mask) grid
    pub output: PathBuf,
    /// If set, each mask is also saved here as `<stem>_mask.png`
    pub masks_dir: Option<PathBuf>,
    /// If set, a JSON summary of the run is written here
    pub summary: Option<PathBuf>,
    pub batch: BatchConfig,
    pub pipeline: PipelineConfig,
    pub grid: GridLayout,
}

impl Default for Job {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_GRID_OUTPUT),
            masks_dir: None,
            summary: None,
            batch: BatchConfig::default(),
            pipeline: PipelineConfig::default(),
            grid: GridLayout::default(),
        }
    }
}

impl Job {
    /// Get the JSON schema of the job file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Job)
    }

    /// Load a job from TOML string
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a job from JSON string
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load the job
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&fs::read_to_string(path)?),
            Some("json") => Self::from_json(&fs::read_to_string(path)?),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// Convert the job to TOML string
    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert the job to JSON string
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// Save the job, choosing the format from the extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(CliError::UnsupportedFileFormat),
        };
        fs::write(path, content)?;
        Ok(())
    }

    /// Replace job settings with the ones given on the command line
    pub fn apply_overrides(&mut self, overrides: SegmentOverrides) {
        if let Some(dir) = overrides.input_dir {
            self.batch.input_dir = dir;
        }
        if let Some(path) = overrides.output {
            self.output = path;
        }
        if overrides.masks_dir.is_some() {
            self.masks_dir = overrides.masks_dir;
        }
        if overrides.summary.is_some() {
            self.summary = overrides.summary;
        }
    }
}

/// Command-line values that take precedence over the job file
#[derive(Debug, Clone, Default)]
pub struct SegmentOverrides {
    pub input_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub masks_dir: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

/// What a `segment` run wrote
#[derive(Debug, Clone)]
pub struct SegmentOutcome {
    pub summary: BatchSummary,
    /// `None` when no image could be processed
    pub grid: Option<PathBuf>,
    pub masks: Vec<PathBuf>,
}

/// Segment every accepted image of the job's input directory, then write
/// the summary, the masks and the grid as configured.
///
/// Files that fail to load are counted, not fatal. If nothing could be
/// processed, a warning is logged and no grid is written.
pub fn run_segment(job: &Job) -> Result<SegmentOutcome, CliError> {
    let pipeline = PipelineBuilder::from_config(&job.pipeline)?;
    let driver = BatchDriver::new(job.batch.clone(), pipeline);
    let report = driver.run()?;
    let summary = report.summary();

    if let Some(path) = &job.summary {
        fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        info!("Summary written to {}", path.display());
    }

    if report.processed.is_empty() {
        warn!(
            "No image in {} could be processed; nothing to render",
            job.batch.input_dir.display()
        );
        return Ok(SegmentOutcome {
            summary,
            grid: None,
            masks: Vec::new(),
        });
    }

    let masks = match &job.masks_dir {
        Some(dir) => save_masks(&report.processed, dir)?,
        None => Vec::new(),
    };

    let output = if job.output.as_os_str().is_empty() {
        PathBuf::from(DEFAULT_GRID_OUTPUT)
    } else {
        job.output.clone()
    };
    save_grid(&report.processed, &job.grid, &output)?;

    info!(
        "✅ Segmented {} image(s), {} failed to load",
        summary.processed, summary.failed
    );
    Ok(SegmentOutcome {
        summary,
        grid: Some(output),
        masks,
    })
}
