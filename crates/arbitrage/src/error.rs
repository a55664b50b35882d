//! Engine and cache error types.

use std::path::PathBuf;

use parallel::PoolError;
use storage::StorageError;
use types::ConfigError;

/// Failure to persist or restore the result cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode cache: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("cache data is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("cache was saved under different analysis settings")]
    SettingsChanged,
}

/// Errors surfaced by the analysis engine.
///
/// Only configuration and I/O problems reach the caller; per-pair failures
/// are logged and dropped inside the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("no usable stock data in {0}")]
    NoData(PathBuf),
}

pub type EngineResult<T> = Result<T, EngineError>;
