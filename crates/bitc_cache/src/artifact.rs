//! Reading, writing, and validating serialized native artifacts.
//!
//! On-disk layout: a 4-byte little-endian header length, the bincode-encoded
//! [`ArtifactHeader`], then the bincode-encoded [`ArtifactImage`] payload.
//! The header carries everything the validity check needs, so a probe never
//! has to deserialize the payload or re-read the original bitcode.

use std::path::{Path, PathBuf};

use bitc_common::{ContentHash, Crc32};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::identity::CacheIdentity;
use crate::image::ArtifactImage;

/// Magic bytes identifying a bitc cache artifact.
const ARTIFACT_MAGIC: [u8; 4] = *b"BITC";

/// Current artifact format version. Increment on breaking changes to
/// the header or payload format.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every cached artifact.
///
/// Carries the provenance fields the validity rule compares against a
/// [`CacheIdentity`] (resource name, source mod-time, source CRC) plus a
/// content hash of the payload for corruption detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Magic bytes: must be `b"BITC"`.
    pub magic: [u8; 4],

    /// Artifact format version.
    pub format_version: u32,

    /// Resource name the artifact was produced for.
    pub resource_name: String,

    /// Modification timestamp of the bitcode source the artifact was built from.
    pub source_mod_time: i64,

    /// CRC-32 of the bitcode source the artifact was built from.
    pub source_crc: Crc32,

    /// Content hash of the payload bytes (for integrity checks).
    pub checksum: ContentHash,
}

impl ArtifactHeader {
    /// Applies the exact-match validity rule against a cache identity.
    ///
    /// The artifact may be served only when resource name, source mod-time,
    /// and source CRC all match; a difference in any one field is a miss.
    pub fn is_valid_for(&self, identity: &CacheIdentity) -> bool {
        self.resource_name == identity.resource_name()
            && self.source_mod_time == identity.source_mod_time()
            && self.source_crc == identity.source_crc()
    }
}

/// Writes a serialized artifact for the given identity, returning its path.
///
/// Creates the cache directory if it doesn't exist. This is the production
/// side of the contract: the script core only consumes artifacts, while the
/// host (or the compiling backend) persists them after a successful compile.
pub fn write_artifact(
    identity: &CacheIdentity,
    image: &ArtifactImage,
) -> Result<PathBuf, CacheError> {
    std::fs::create_dir_all(identity.cache_dir()).map_err(|e| CacheError::Io {
        path: identity.cache_dir().to_path_buf(),
        source: e,
    })?;

    let payload = bincode::serde::encode_to_vec(image, bincode::config::standard()).map_err(
        |e| CacheError::Serialization {
            reason: e.to_string(),
        },
    )?;

    let header = ArtifactHeader {
        magic: ARTIFACT_MAGIC,
        format_version: ARTIFACT_FORMAT_VERSION,
        resource_name: identity.resource_name().to_string(),
        source_mod_time: identity.source_mod_time(),
        source_crc: identity.source_crc(),
        checksum: ContentHash::from_bytes(&payload),
    };

    let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
        .map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;

    // Layout: 4-byte header length (little-endian) + header + payload
    let header_len = header_bytes.len() as u32;
    let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(&payload);

    let path = identity.artifact_path();
    std::fs::write(&path, &output).map_err(|e| CacheError::Io {
        path: path.clone(),
        source: e,
    })?;

    Ok(path)
}

/// Reads and validates only the header of an artifact file.
///
/// Returns `None` if the file doesn't exist, is truncated, has the wrong
/// magic, or has a mismatched format version. Fail-safe: any problem is
/// a cache miss.
pub fn read_header(path: &Path) -> Option<ArtifactHeader> {
    let raw = std::fs::read(path).ok()?;
    parse_header(&raw).map(|(header, _)| header)
}

/// Returns `true` if a valid artifact for this identity exists on disk.
///
/// Header-only check: the payload is not deserialized or checksummed here,
/// so a probe is cheap even for large artifacts.
pub fn probe(identity: &CacheIdentity) -> bool {
    read_header(&identity.artifact_path())
        .map(|header| header.is_valid_for(identity))
        .unwrap_or(false)
}

/// Reads, validates, and deserializes the artifact for the given identity.
///
/// Returns `None` on any structural problem, version skew, identity
/// mismatch, or payload checksum failure. Fail-safe: corruption results in
/// a cache miss, never an error.
pub fn read_artifact(identity: &CacheIdentity) -> Option<ArtifactImage> {
    let raw = std::fs::read(identity.artifact_path()).ok()?;
    let (header, payload_start) = parse_header(&raw)?;

    if !header.is_valid_for(identity) {
        return None;
    }

    let payload = &raw[payload_start..];
    if ContentHash::from_bytes(payload) != header.checksum {
        return None;
    }

    let (image, _): (ArtifactImage, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard()).ok()?;
    Some(image)
}

/// Parses and structurally validates the header, returning it together with
/// the byte offset where the payload begins.
fn parse_header(raw: &[u8]) -> Option<(ArtifactHeader, usize)> {
    // Need at least 4 bytes for the header length
    if raw.len() < 4 {
        return None;
    }

    let header_len = u32::from_le_bytes(raw[..4].try_into().ok()?) as usize;
    if raw.len() < 4 + header_len {
        return None;
    }

    let header: ArtifactHeader =
        bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
            .ok()?
            .0;

    if header.magic != ARTIFACT_MAGIC {
        return None;
    }

    if header.format_version != ARTIFACT_FORMAT_VERSION {
        return None;
    }

    Some((header, 4 + header_len))
}
