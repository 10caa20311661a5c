//! The compiling-collaborator seam.

use std::sync::Arc;

use bitc_cache::ArtifactImage;

/// A caller-supplied hook resolving symbols the script itself cannot.
///
/// Invoked by the compiling collaborator for every reference left
/// unresolved after linking; returning `None` leaves the reference
/// unresolved. When the same hook is shared across scripts driven by
/// different threads it must be reentrant, which the `Send + Sync` bound
/// enforces at the type level.
pub type SymbolResolver = Arc<dyn Fn(&str) -> Option<*const u8> + Send + Sync>;

/// A bitcode module retained for a later [`compile`](crate::Script::compile) call.
///
/// Holds the primary module from ingestion plus any additional modules
/// merged in before compilation. Once any module has been linked, a
/// previously computed cache identity no longer describes the unit and
/// cache loads are refused.
#[derive(Debug, Clone, Default)]
pub struct PendingModule {
    /// The primary bitcode module, as ingested.
    pub bitcode: Vec<u8>,

    /// Additional modules to merge before compilation, in link order.
    pub linked: Vec<Vec<u8>>,
}

impl PendingModule {
    /// Creates a pending module holding the given primary bitcode.
    pub fn new(bitcode: Vec<u8>) -> Self {
        Self {
            bitcode,
            linked: Vec::new(),
        }
    }

    /// Returns `true` if additional modules were linked in.
    pub fn has_linked_modules(&self) -> bool {
        !self.linked.is_empty()
    }
}

/// A diagnostic reported by the compiling collaborator on failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct CompileFailure {
    /// Human-readable diagnostic text.
    pub message: String,
}

impl CompileFailure {
    /// Creates a failure with the given diagnostic text.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The code-generation backend that turns bitcode into a native image.
///
/// The script core treats this as opaque: it forwards the pending module
/// and the registered symbol resolver, and stores whatever image comes
/// back. Instruction selection, optimization, and relocation live entirely
/// behind this trait.
pub trait Compiler {
    /// Structurally validates a bitcode buffer.
    ///
    /// Called at ingestion so malformed input is rejected before any cache
    /// probe or compilation work. An empty buffer never reaches this.
    fn validate(&self, bitcode: &[u8]) -> bool;

    /// Compiles the pending module into a native image.
    ///
    /// `resolver`, when present, must be consulted for symbols the module
    /// leaves unresolved.
    fn compile(
        &self,
        module: &PendingModule,
        resolver: Option<&SymbolResolver>,
    ) -> Result<ArtifactImage, CompileFailure>;
}
