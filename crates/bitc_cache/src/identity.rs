//! Cache identities naming a bitcode unit's provenance.

use std::path::{Path, PathBuf};

use bitc_common::Crc32;

/// File extension for serialized native artifacts.
const ARTIFACT_EXT: &str = "ncache";

/// Immutable descriptor of a bitcode unit's provenance.
///
/// A `CacheIdentity` names a cache entry: the resource name namespaces the
/// entry within the cache directory, while the modification time and CRC-32
/// of the origin file pin the exact source revision the entry was built from.
/// It is meaningful only paired with the bitcode bytes it was computed from,
/// and has no mutators once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheIdentity {
    resource_name: String,
    source_mod_time: i64,
    source_crc: Crc32,
    cache_dir: PathBuf,
}

impl CacheIdentity {
    /// Creates a new cache identity.
    pub fn new(
        resource_name: impl Into<String>,
        source_mod_time: i64,
        source_crc: Crc32,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            source_mod_time,
            source_crc,
            cache_dir: cache_dir.into(),
        }
    }

    /// The resource name namespacing this cache entry.
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Modification timestamp of the bitcode's origin file.
    pub fn source_mod_time(&self) -> i64 {
        self.source_mod_time
    }

    /// CRC-32 checksum of the bitcode's origin file.
    pub fn source_crc(&self) -> Crc32 {
        self.source_crc
    }

    /// The cache directory probed for a matching artifact.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// The path where an artifact for this identity would be stored.
    pub fn artifact_path(&self) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{ARTIFACT_EXT}", self.resource_name))
    }
}
