//! Storage error type.

use std::path::PathBuf;

/// Failure to read input data or write results.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} contains no valid data rows")]
    NoValidRows(PathBuf),

    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Pool(#[from] parallel::PoolError),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Path the failure refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Io { path, .. } | Self::Json { path, .. } | Self::NoValidRows(path) => Some(path),
            Self::Pool(_) => None,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
