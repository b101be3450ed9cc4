//! Error types for the cache tables
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors returned by cache table lookups and deletions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is not present and no data loader is configured
    #[error("Key not found in cache")]
    KeyNotFound,

    /// Key is not present and the configured data loader declined to produce it
    #[error("Key not found and could not be loaded into cache")]
    KeyNotFoundOrNotLoadable,
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
