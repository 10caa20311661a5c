//! Shared foundational types for the bitc script-compilation toolkit.
//!
//! This crate provides the checksum and hash types used by the cache layer
//! to decide whether a previously compiled native artifact can be reused.

#![warn(missing_docs)]

pub mod checksum;
pub mod hash;

pub use checksum::Crc32;
pub use hash::ContentHash;
