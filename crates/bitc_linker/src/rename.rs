//! Symbol rename table with wrap and portable rewrite rules.

use std::collections::HashMap;

use bitc_diagnostics::{Diagnostic, DiagnosticSink};

/// A table of symbol renames applied by the linking backend.
///
/// Two independent rewrite rules populate it:
///
/// - **wrap**: calls to `X` are redirected to `__wrap_X`, and the original
///   definition stays reachable as `__real_X`.
/// - **portable**: calls to `X` are redirected to `X_portable`, with the
///   original again reachable as `__real_X`.
///
/// Re-registering a rename for a symbol that already has one is not an
/// error: the new mapping overwrites the old and a warning naming the
/// collision is emitted.
#[derive(Debug, Default)]
pub struct RenameMap {
    map: HashMap<String, String>,
}

impl RenameMap {
    /// Creates an empty rename table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a wrap rule for `symbol`.
    pub fn add_wrap(&mut self, symbol: &str, sink: &DiagnosticSink) {
        self.insert(symbol.to_string(), format!("__wrap_{symbol}"), sink);
        self.insert(format!("__real_{symbol}"), symbol.to_string(), sink);
    }

    /// Registers a portable rule for `symbol`.
    pub fn add_portable(&mut self, symbol: &str, sink: &DiagnosticSink) {
        self.insert(symbol.to_string(), format!("{symbol}_portable"), sink);
        self.insert(format!("__real_{symbol}"), symbol.to_string(), sink);
    }

    /// Returns the rewritten name for `name`, if a rule applies.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    /// Returns the number of registered rewrite entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no rewrite entries are registered.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn insert(&mut self, from: String, to: String, sink: &DiagnosticSink) {
        if let Some(previous) = self.map.insert(from.clone(), to.clone()) {
            sink.emit(
                Diagnostic::warning(format!("symbol '{from}' is renamed again, to '{to}'"))
                    .with_note(format!("previous mapping to '{previous}' is discarded")),
            );
        }
    }
}
