//! The script compilation/cache lifecycle core.
//!
//! A [`Script`] accepts raw bitcode together with a
//! [`CacheIdentity`](bitc_cache::CacheIdentity), decides whether a previously
//! compiled native artifact can be reused verbatim, otherwise drives the
//! compiling collaborator, and then answers symbol, export, and pragma
//! queries from whichever backend resolved it. Errors are reported through a
//! latched single-slot channel with first-error-wins, get-and-clear
//! semantics.
//!
//! A `Script` is single-use: once resolved (compiled or cache-loaded) it
//! never transitions back, and it is meant to be driven by one logical
//! caller for its whole ingest → resolve → query lifetime. Independent
//! scripts are independent and may live on different threads.

#![warn(missing_docs)]

pub mod backend;
pub mod compiler;
pub mod error;
pub mod script;

pub use backend::{ArtifactBackend, CachedArtifact, CompiledArtifact};
pub use compiler::{CompileFailure, Compiler, PendingModule, SymbolResolver};
pub use error::{ErrorCode, ErrorSlot};
pub use script::Script;
