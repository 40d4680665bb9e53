//! Error types for loading fixtures and credentials

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for fixture loading
pub type LoadResult<T> = Result<T, FixtureLoadError>;

/// A fixture file could not be used. The fixture is skipped, the run goes on.
#[derive(Debug, Error)]
pub enum FixtureLoadError {
    /// Failed to read the file
    #[error("failed to read fixture {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid fixture document
    #[error("failed to parse fixture {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FixtureLoadError {
    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        FixtureLoadError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, source: serde_json::Error) -> Self {
        FixtureLoadError::Parse {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path of the fixture that failed to load
    pub fn path(&self) -> &PathBuf {
        match self {
            FixtureLoadError::Read { path, .. } | FixtureLoadError::Parse { path, .. } => path,
        }
    }
}

/// The credential file could not be used. Fatal for the whole run.
#[derive(Debug, Error)]
pub enum CredentialLoadError {
    #[error("failed to read credential file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse credential file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CredentialLoadError {
    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        CredentialLoadError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, source: serde_json::Error) -> Self {
        CredentialLoadError::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}
