use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Main application error type covering every failure that aborts a run.
///
/// Unassignable files and validation findings are not errors: they are
/// recorded in the package and in the report files.
#[derive(Error, Debug)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported input: {path} - {reason}")]
    UnsupportedInput { path: PathBuf, reason: String },

    #[error("Archive error: {path} - {details}")]
    Archive { path: PathBuf, details: String },

    #[error("Failed to copy {source_path} to {destination}: {source}")]
    Copy {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report error: {path} - {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PackageError {
    /// Wrap an I/O failure on a report artifact.
    pub fn report(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PackageError::Report {
            path: path.into(),
            source,
        }
    }

    /// Wrap a failure reading or unpacking an archive.
    pub fn archive(path: impl Into<PathBuf>, details: impl ToString) -> Self {
        PackageError::Archive {
            path: path.into(),
            details: details.to_string(),
        }
    }
}

impl From<ConfigError> for PackageError {
    fn from(err: ConfigError) -> Self {
        PackageError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PackageError>;
