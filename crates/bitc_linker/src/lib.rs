//! Link-time configuration for the native code-generation backend.
//!
//! The script core consumes this crate only through the [`LinkerConfig`]
//! handle: target-triple resolution, per-invocation output options, `-z`
//! hardening toggles, the symbol rename table (wrap/portable rules), and the
//! library search path. Misconfiguration that the link can survive (missing
//! search directory, re-registered rename) is reported as a warning
//! diagnostic and skipped; only an unsupported target triple fails closed.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod rename;
pub mod target;
pub mod zflags;

pub use config::LinkerConfig;
pub use error::ConfigError;
pub use rename::RenameMap;
pub use target::{lookup_target, Arch, Target};
pub use zflags::{ZFlags, ZOption};
