//! Payload integrity hashing for serialized artifacts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 hash guarding a serialized artifact payload against corruption.
///
/// Unlike [`Crc32`](crate::Crc32), which identifies the *source* a script was
/// built from, a `ContentHash` covers the serialized artifact bytes themselves.
/// A mismatch on load means the artifact file was truncated or tampered with
/// and must be treated as a cache miss.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(u128);

impl ContentHash {
    /// Computes the XXH3-128 hash of a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:08x}..)", (self.0 >> 96) as u32)
    }
}
