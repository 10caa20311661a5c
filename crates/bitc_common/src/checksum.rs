//! 32-bit source checksums used in cache identities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A CRC-32 checksum of a bitcode source file.
///
/// Callers that already track a checksum for their source (most hosts do)
/// construct one with [`from_raw`](Self::from_raw); [`from_bytes`](Self::from_bytes)
/// computes it from the file contents. A cached artifact is only reusable
/// when the recorded checksum matches the one supplied at ingestion exactly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crc32(u32);

impl Crc32 {
    /// Computes the CRC-32 checksum of a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(crc32fast::hash(data))
    }

    /// Wraps a caller-supplied checksum value.
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw 32-bit checksum value.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Crc32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl fmt::Debug for Crc32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crc32({:08x})", self.0)
    }
}
