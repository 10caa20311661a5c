//! Diagnostic reporting for the bitc toolkit.
//!
//! Collaborators (the linker configurator, the compiling backend) never print
//! to stderr directly; they emit structured [`Diagnostic`]s into a shared
//! [`DiagnosticSink`]. The host decides how and when to render them. The crate
//! also provides the [`CleanupRegistry`], a scoped replacement for process-wide
//! "remove this file on abnormal exit" signal handlers.

#![warn(missing_docs)]

pub mod cleanup;
pub mod diagnostic;
pub mod severity;
pub mod sink;

pub use cleanup::CleanupRegistry;
pub use diagnostic::Diagnostic;
pub use severity::Severity;
pub use sink::DiagnosticSink;
