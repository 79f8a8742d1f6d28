use std::time::Duration;

use thiserror::Error;

/// Failures reported by a [`MappingStore`](crate::domain::repository::MappingStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("store backend error: {0:#}")]
    Backend(#[from] anyhow::Error),
}

/// Every way `shorten` and `resolve` can fail. Each kind maps to a distinct HTTP status.
#[derive(Debug, Error)]
pub enum ShortenError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("URL not found")]
    NotFound,
    #[error("no free short id after {attempts} attempts")]
    GeneratorExhausted { attempts: usize },
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("short id length must be at least 1")]
    ZeroLength,
    #[error("alphabet needs at least 2 distinct characters")]
    AlphabetTooSmall,
    #[error("alphabet contains a character that is not URL-safe: {0:?}")]
    UnsafeCharacter(char),
    #[error("alphabet contains {0:?} more than once")]
    DuplicateCharacter(char),
    #[error("max retries must be at least 1")]
    ZeroRetries,
    #[error("POSTGRES_DSN is required for the postgres store backend")]
    MissingDsn,
}
