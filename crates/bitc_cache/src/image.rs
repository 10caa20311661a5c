//! The logical tables of a produced native artifact.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The in-memory representation of a produced native script.
///
/// Whether the script was freshly compiled or deserialized from a cache
/// artifact, the host sees the same tables: the native image bytes, the
/// symbol table, exported variables and functions, embedded pragmas, and
/// per-function binary extents. Offsets are relative to the start of `code`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactImage {
    /// Native image bytes, directly executable once relocated by the host.
    pub code: Vec<u8>,

    /// Symbol table: name to offset within `code`.
    pub symbols: HashMap<String, u64>,

    /// Exported variables, in the order the source declared them.
    pub export_vars: Vec<ExportEntry>,

    /// Exported functions, in the order the source declared them.
    pub export_funcs: Vec<ExportEntry>,

    /// Embedded key/value metadata, in source order.
    pub pragmas: Vec<Pragma>,

    /// Per-function binary extents, keyed by function name.
    pub functions: HashMap<String, FunctionExtent>,
}

/// A single exported variable or function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    /// Exported name, as the host looks it up.
    pub name: String,
    /// Offset within the native image.
    pub offset: u64,
}

/// A single `#pragma`-style key/value metadata entry embedded in the script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pragma {
    /// Pragma key.
    pub key: String,
    /// Pragma value.
    pub value: String,
}

/// The binary extent of a single function within the native image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionExtent {
    /// Offset of the function's first byte within the native image.
    pub offset: u64,
    /// Size of the function body in bytes.
    pub size: u64,
}

impl ArtifactImage {
    /// Returns `true` if the image holds no code and no tables.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
            && self.symbols.is_empty()
            && self.export_vars.is_empty()
            && self.export_funcs.is_empty()
            && self.pragmas.is_empty()
            && self.functions.is_empty()
    }
}
