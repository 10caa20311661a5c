//! Error types for linker configuration.

/// Errors that can occur while constructing a [`LinkerConfig`](crate::LinkerConfig).
///
/// Most configuration problems degrade to warnings (see the crate docs);
/// an unrecognized target triple is the one that fails closed, since no
/// sensible link can proceed without a target.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The target triple does not match any registered target.
    #[error("cannot initialize target for triple '{triple}': {reason}")]
    UnsupportedTriple {
        /// The triple that was requested.
        triple: String,
        /// Why no target matched.
        reason: String,
    },
}
