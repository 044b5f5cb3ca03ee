//! Error types for file loading.

use std::path::{Path, PathBuf};

use cascade_core::CascadeError;
use thiserror::Error;

/// Result type for file loading.
pub type FileResult<T> = Result<T, FileError>;

/// Failure to load one of the data files. Every variant names the file.
#[derive(Error, Debug)]
pub enum FileError {
    /// The file could not be opened or read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not well-formed CSV.
    #[error("Malformed CSV in {}: {source}", .path.display())]
    Csv {
        /// File that failed.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// The file parsed but its records were rejected.
    #[error("Invalid data in {}: {source}", .path.display())]
    Load {
        /// File that failed.
        path: PathBuf,
        /// Validation or ownership error.
        source: CascadeError,
    },
}

impl FileError {
    /// Creates an I/O error.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a CSV error.
    pub fn csv(path: impl AsRef<Path>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a load error.
    pub fn load(path: impl AsRef<Path>, source: CascadeError) -> Self {
        Self::Load {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// File the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Csv { path, .. } | Self::Load { path, .. } => path,
        }
    }
}
