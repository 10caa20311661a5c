//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while writing a cache artifact.
///
/// Reads are fail-safe and never surface these: a read problem is a cache
/// miss (`None`), triggering recompilation. Only the production side, which
/// must tell the caller whether the artifact actually landed on disk,
/// propagates errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while writing the artifact file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The artifact header or payload could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
