use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a file on disk into an image buffer.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not load image at {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image at {} has no pixels", path.display())]
    Empty { path: PathBuf },
}

impl LoadError {
    /// Path of the file that failed to load
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Decode { path, .. } | Self::Empty { path } => path,
        }
    }
}

#[derive(Error, Debug)]
pub enum FundusError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Nothing to render: no segmented images")]
    EmptyGrid,
}

pub type Result<T> = std::result::Result<T, FundusError>;
