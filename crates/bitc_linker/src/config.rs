//! The opaque configuration handle handed to the compiling backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bitc_diagnostics::{Diagnostic, DiagnosticSink};

use crate::error::ConfigError;
use crate::rename::RenameMap;
use crate::target::{lookup_target, Target};
use crate::zflags::{ZFlags, ZOption};

/// Link-time options consumed opaquely by the compiling backend.
///
/// Constructed per link invocation. Everything except the target triple is
/// optional; misconfiguration the link can survive is downgraded to a
/// warning in the shared [`DiagnosticSink`] and skipped.
pub struct LinkerConfig {
    triple: String,
    target: &'static Target,
    shared: bool,
    soname: Option<String>,
    dyld: Option<String>,
    sysroot: Option<PathBuf>,
    bsymbolic: bool,
    z_options: Vec<ZOption>,
    renames: RenameMap,
    search_dirs: Vec<PathBuf>,
    sink: Arc<DiagnosticSink>,
}

impl LinkerConfig {
    /// Creates a configuration for the given target triple.
    ///
    /// Fails closed with [`ConfigError::UnsupportedTriple`] when no
    /// registered target matches; the error is also recorded in the sink.
    pub fn new(triple: &str, sink: Arc<DiagnosticSink>) -> Result<Self, ConfigError> {
        let target = match lookup_target(triple) {
            Ok(target) => target,
            Err(err) => {
                sink.emit(Diagnostic::error(err.to_string()));
                return Err(err);
            }
        };

        Ok(Self {
            triple: triple.to_string(),
            target,
            shared: false,
            soname: None,
            dyld: None,
            sysroot: None,
            bsymbolic: false,
            z_options: ZFlags::empty().expand(),
            renames: RenameMap::new(),
            search_dirs: Vec::new(),
            sink,
        })
    }

    /// The target triple this configuration was created for.
    pub fn triple(&self) -> &str {
        &self.triple
    }

    /// The resolved target.
    pub fn target(&self) -> &'static Target {
        self.target
    }

    /// Enables or disables shared-object output.
    pub fn set_shared(&mut self, enable: bool) {
        self.shared = enable;
    }

    /// Returns `true` if shared-object output is enabled.
    pub fn shared(&self) -> bool {
        self.shared
    }

    /// Sets the SONAME recorded in the output.
    pub fn set_soname(&mut self, soname: impl Into<String>) {
        self.soname = Some(soname.into());
    }

    /// The SONAME, if one was set.
    pub fn soname(&self) -> Option<&str> {
        self.soname.as_deref()
    }

    /// Sets the dynamic loader path recorded in the output.
    pub fn set_dyld(&mut self, dyld: impl Into<String>) {
        self.dyld = Some(dyld.into());
    }

    /// The dynamic loader path, if one was set.
    pub fn dyld(&self) -> Option<&str> {
        self.dyld.as_deref()
    }

    /// Sets the sysroot used to resolve `=`-prefixed search directories.
    pub fn set_sysroot(&mut self, sysroot: impl Into<PathBuf>) {
        self.sysroot = Some(sysroot.into());
    }

    /// The sysroot, if one was set.
    pub fn sysroot(&self) -> Option<&Path> {
        self.sysroot.as_deref()
    }

    /// Enables or disables `-Bsymbolic` binding.
    pub fn set_bsymbolic(&mut self, enable: bool) {
        self.bsymbolic = enable;
    }

    /// Returns `true` if `-Bsymbolic` binding is enabled.
    pub fn bsymbolic(&self) -> bool {
        self.bsymbolic
    }

    /// Replaces the `-z` option list with the expansion of `flags`.
    pub fn set_z_flags(&mut self, flags: ZFlags) {
        self.z_options = flags.expand();
    }

    /// The expanded `-z` option list.
    pub fn z_options(&self) -> &[ZOption] {
        &self.z_options
    }

    /// Registers a wrap rename rule for `symbol`.
    ///
    /// Collisions with an existing rule overwrite the mapping and emit a
    /// warning; see [`RenameMap`].
    pub fn add_wrap(&mut self, symbol: &str) {
        self.renames.add_wrap(symbol, &self.sink);
    }

    /// Registers a portable rename rule for `symbol`.
    pub fn add_portable(&mut self, symbol: &str) {
        self.renames.add_portable(symbol, &self.sink);
    }

    /// The symbol rename table.
    pub fn renames(&self) -> &RenameMap {
        &self.renames
    }

    /// Adds a library search directory.
    ///
    /// A leading `=` makes the path sysroot-relative. Paths that do not
    /// exist or are not directories are warned about and skipped; a bad
    /// search directory never fails the whole configuration.
    pub fn add_search_dir(&mut self, dir: &str) {
        let path = match dir.strip_prefix('=') {
            Some(rest) => match &self.sysroot {
                Some(sysroot) => sysroot.join(rest.trim_start_matches('/')),
                None => {
                    self.sink.emit(Diagnostic::warning(format!(
                        "cannot open search directory '{dir}'"
                    )));
                    return;
                }
            },
            None => PathBuf::from(dir),
        };

        if path.is_dir() {
            self.search_dirs.push(path);
        } else {
            self.sink.emit(Diagnostic::warning(format!(
                "cannot open search directory '{dir}'"
            )));
        }
    }

    /// The accepted library search directories, in registration order.
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// The diagnostic sink this configuration reports through.
    pub fn sink(&self) -> &Arc<DiagnosticSink> {
        &self.sink
    }
}
