//! Persisted native-artifact format and cache-validity checking.
//!
//! A compiled script can be serialized to disk and reused on a later run
//! instead of recompiling. This crate defines the on-disk artifact format
//! (validated header plus bincode payload), the [`CacheIdentity`] that names
//! a cache entry, and the exact-match validity rule deciding whether a stored
//! artifact may be served. All reads are fail-safe: corruption, version skew,
//! or identity mismatch produce a cache miss, never an error.

#![warn(missing_docs)]

pub mod artifact;
pub mod error;
pub mod identity;
pub mod image;

pub use artifact::{probe, read_artifact, read_header, write_artifact, ArtifactHeader};
pub use error::CacheError;
pub use identity::CacheIdentity;
pub use image::{ArtifactImage, ExportEntry, FunctionExtent, Pragma};
