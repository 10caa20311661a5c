//! The single-script lifecycle state machine.

use std::sync::Arc;

use bitc_cache::{read_artifact, read_header, CacheIdentity, Pragma};
use bitc_diagnostics::{CleanupRegistry, Diagnostic, DiagnosticSink};

use crate::backend::{ArtifactBackend, CachedArtifact, CompiledArtifact};
use crate::compiler::{Compiler, PendingModule, SymbolResolver};
use crate::error::{ErrorCode, ErrorSlot};

/// Lifecycle state: `Unknown` until a backend is produced, then `Resolved`
/// forever. There is no transition back.
enum State {
    Unknown { pending: Option<PendingModule> },
    Resolved(ArtifactBackend),
}

/// A single translatable script and its compilation/cache state machine.
///
/// Drives one bitcode unit from ingestion to a resolved native backend,
/// either by invoking the compiling collaborator or by reusing a valid
/// on-disk artifact, then serves symbol and table queries from whichever
/// backend is live. Not safe for concurrent use; each instance belongs to
/// one logical caller for its whole lifetime.
pub struct Script {
    state: State,
    errors: ErrorSlot,
    compiler: Box<dyn Compiler>,
    resolver: Option<SymbolResolver>,
    compiler_message: Option<String>,
    teardown: Option<(Arc<DiagnosticSink>, Arc<CleanupRegistry>)>,
}

impl Script {
    /// Creates an unresolved script driven by the given compiling collaborator.
    pub fn new(compiler: Box<dyn Compiler>) -> Self {
        Self {
            state: State::Unknown { pending: None },
            errors: ErrorSlot::new(),
            compiler,
            resolver: None,
            compiler_message: None,
            teardown: None,
        }
    }

    /// Routes collaborator diagnostics through this script and arms the
    /// cleanup registry.
    ///
    /// When a script that recorded at least one error (in its slot or in
    /// the attached sink) is dropped, the registry's handlers run before
    /// the backend is released, so resources registered for
    /// remove-on-abnormal-teardown are cleaned up first.
    pub fn attach_teardown(&mut self, sink: Arc<DiagnosticSink>, cleanup: Arc<CleanupRegistry>) {
        self.teardown = Some((sink, cleanup));
    }

    /// Returns `true` once a backend is live.
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, State::Resolved(_))
    }

    /// The live backend, if the script has resolved.
    pub fn backend(&self) -> Option<&ArtifactBackend> {
        match &self.state {
            State::Resolved(backend) => Some(backend),
            State::Unknown { .. } => None,
        }
    }

    /// Ingests raw bitcode plus its cache identity.
    ///
    /// Probes the cache directory for an artifact recorded under the
    /// identity's resource name: when one exists whose stored mod-time and
    /// CRC both match, the load path is taken and the script resolves
    /// without compiling. Otherwise the bitcode is retained for an explicit
    /// [`compile`](Self::compile) call.
    ///
    /// A valid-looking entry that fails to deserialize latches
    /// [`ErrorCode::CacheMiss`] but still retains the bitcode, so the
    /// caller's fallback to `compile` works unchanged.
    pub fn ingest_bitcode(
        &mut self,
        bitcode: &[u8],
        identity: &CacheIdentity,
    ) -> Result<(), ErrorCode> {
        if self.is_resolved() {
            return self.fail(ErrorCode::InvalidState);
        }
        if bitcode.is_empty() || !self.compiler.validate(bitcode) {
            return self.fail(ErrorCode::InvalidBitcode);
        }

        let cache_hit = read_header(&identity.artifact_path())
            .map(|header| header.is_valid_for(identity))
            .unwrap_or(false);

        self.state = State::Unknown {
            pending: Some(PendingModule::new(bitcode.to_vec())),
        };

        if cache_hit {
            return self.load_from_cache(identity);
        }
        Ok(())
    }

    /// Merges a second bitcode module into the pending unit.
    ///
    /// Illegal once resolved or before any bitcode was ingested. Linking
    /// invalidates the ingested cache identity: the merged unit no longer
    /// matches what any stored artifact was built from, so a subsequent
    /// [`load_from_cache`](Self::load_from_cache) misses and compilation is
    /// forced.
    pub fn link_bitcode(&mut self, bitcode: &[u8]) -> Result<(), ErrorCode> {
        if bitcode.is_empty() || !self.compiler.validate(bitcode) {
            return self.fail(ErrorCode::InvalidBitcode);
        }
        let State::Unknown {
            pending: Some(pending),
        } = &mut self.state
        else {
            return self.fail(ErrorCode::InvalidState);
        };
        pending.linked.push(bitcode.to_vec());
        Ok(())
    }

    /// Attempts to resolve the script from a serialized on-disk artifact.
    ///
    /// On success the script holds a `Cached` backend. Failure is the soft
    /// [`ErrorCode::CacheMiss`]: state stays `Unknown` and the caller is
    /// expected to fall back to [`compile`](Self::compile).
    pub fn load_from_cache(&mut self, identity: &CacheIdentity) -> Result<(), ErrorCode> {
        if self.is_resolved() {
            return self.fail(ErrorCode::InvalidState);
        }
        let identity_invalidated = matches!(
            &self.state,
            State::Unknown { pending: Some(pending) } if pending.has_linked_modules()
        );
        if identity_invalidated {
            // The identity no longer describes the merged unit.
            return self.fail(ErrorCode::CacheMiss);
        }

        match read_artifact(identity) {
            Some(image) => {
                self.state = State::Resolved(ArtifactBackend::Cached(CachedArtifact::new(image)));
                Ok(())
            }
            None => self.fail(ErrorCode::CacheMiss),
        }
    }

    /// Compiles the pending module through the compiling collaborator.
    ///
    /// The registered symbol resolver, if any, is forwarded so the backend
    /// can satisfy references the script itself cannot. On success the
    /// script holds a `Compiled` backend. On collaborator failure the
    /// pending module is kept, [`ErrorCode::CompileError`] is latched, and
    /// the diagnostic text is retained for
    /// [`compiler_error_message`](Self::compiler_error_message).
    pub fn compile(&mut self) -> Result<(), ErrorCode> {
        let taken = match &mut self.state {
            State::Resolved(_) => None,
            State::Unknown { pending } => pending.take(),
        };
        let Some(pending) = taken else {
            return self.fail(ErrorCode::InvalidState);
        };

        match self.compiler.compile(&pending, self.resolver.as_ref()) {
            Ok(image) => {
                self.state =
                    State::Resolved(ArtifactBackend::Compiled(CompiledArtifact::new(image)));
                Ok(())
            }
            Err(failure) => {
                if let Some((sink, _)) = &self.teardown {
                    sink.emit(Diagnostic::error(failure.message.clone()));
                }
                self.compiler_message = Some(failure.message);
                self.state = State::Unknown {
                    pending: Some(pending),
                };
                self.fail(ErrorCode::CompileError)
            }
        }
    }

    /// The diagnostic text from the last collaborator failure, `""` if none.
    pub fn compiler_error_message(&self) -> &str {
        self.compiler_message.as_deref().unwrap_or("")
    }

    /// Registers the symbol resolver hook forwarded to the compiling
    /// collaborator.
    ///
    /// Must happen before the script resolves; the hook cannot influence a
    /// backend that already exists.
    pub fn register_symbol_callback(&mut self, resolver: SymbolResolver) -> Result<(), ErrorCode> {
        if self.is_resolved() {
            return self.fail(ErrorCode::InvalidState);
        }
        self.resolver = Some(resolver);
        Ok(())
    }

    /// Resolves a named symbol from the live backend.
    ///
    /// Returns `None` when the script is unresolved or the symbol is
    /// absent; querying never crashes or mutates state.
    pub fn lookup(&self, name: &str) -> Option<*const u8> {
        match &self.state {
            State::Resolved(backend) => backend.lookup(name),
            State::Unknown { .. } => None,
        }
    }

    /// Fills `out` with exported-variable addresses, returning the true count.
    ///
    /// Like all enumeration accessors, this is a benign no-op on an
    /// unresolved script: zero is reported and nothing is written.
    pub fn export_vars(&self, out: &mut [*const u8]) -> usize {
        match &self.state {
            State::Resolved(backend) => backend.export_vars(out),
            State::Unknown { .. } => 0,
        }
    }

    /// Fills `out` with exported-function addresses, returning the true count.
    pub fn export_funcs(&self, out: &mut [*const u8]) -> usize {
        match &self.state {
            State::Resolved(backend) => backend.export_funcs(out),
            State::Unknown { .. } => 0,
        }
    }

    /// Fills `out` with pragma entries, returning the true count.
    pub fn pragmas(&self, out: &mut [Pragma]) -> usize {
        match &self.state {
            State::Resolved(backend) => backend.pragmas(out),
            State::Unknown { .. } => 0,
        }
    }

    /// Fills `out` with function names, returning the true count.
    pub fn functions(&self, out: &mut [String]) -> usize {
        match &self.state {
            State::Resolved(backend) => backend.functions(out),
            State::Unknown { .. } => 0,
        }
    }

    /// Returns the base address and length of a named function's body.
    pub fn function_binary(&self, name: &str) -> Option<(*const u8, usize)> {
        match &self.state {
            State::Resolved(backend) => backend.function_binary(name),
            State::Unknown { .. } => None,
        }
    }

    /// Latches an error code; first error wins.
    pub fn set_error(&mut self, code: ErrorCode) {
        self.errors.set(code);
    }

    /// Returns the latched error, if any, and clears the slot.
    pub fn take_error(&mut self) -> Option<ErrorCode> {
        self.errors.take()
    }

    fn fail(&mut self, code: ErrorCode) -> Result<(), ErrorCode> {
        self.errors.set(code);
        Err(code)
    }
}

impl Drop for Script {
    fn drop(&mut self) {
        // Errors routed through this script mean collaborators may have
        // registered resources for remove-on-abnormal-teardown; run those
        // handlers before the backend's memory goes away.
        let Some((sink, cleanup)) = &self.teardown else {
            return;
        };
        if self.errors.recorded_any() || sink.has_errors() {
            cleanup.run_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitc_cache::{write_artifact, ArtifactImage, ExportEntry, FunctionExtent};
    use bitc_common::Crc32;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Magic prefix the test compiler accepts as "structurally valid".
    const BC_MAGIC: &[u8] = b"BC\xc0\xde";

    /// Deterministic in-memory stand-in for the code-generation backend.
    ///
    /// Produces an image whose tables are derived from the input bytes, so
    /// equal inputs compile to equal tables. Symbols named `ext_*` are
    /// resolved through the registered hook and fail the compile when the
    /// hook is missing or declines.
    struct TestCompiler {
        /// Extra unresolved references the module is pretending to contain.
        externals: Vec<String>,
    }

    impl TestCompiler {
        fn new() -> Self {
            Self {
                externals: Vec::new(),
            }
        }

        fn with_external(name: &str) -> Self {
            Self {
                externals: vec![name.to_string()],
            }
        }
    }

    impl Compiler for TestCompiler {
        fn validate(&self, bitcode: &[u8]) -> bool {
            bitcode.starts_with(BC_MAGIC)
        }

        fn compile(
            &self,
            module: &PendingModule,
            resolver: Option<&SymbolResolver>,
        ) -> Result<ArtifactImage, crate::CompileFailure> {
            if !self.validate(&module.bitcode) {
                return Err(crate::CompileFailure::new("input is not bitcode"));
            }
            for external in &self.externals {
                let resolved = resolver.and_then(|hook| (**hook)(external));
                if resolved.is_none() {
                    return Err(crate::CompileFailure::new(format!(
                        "undefined reference to '{external}'"
                    )));
                }
            }

            let mut code = module.bitcode.clone();
            for linked in &module.linked {
                code.extend_from_slice(linked);
            }

            let mut image = ArtifactImage {
                code,
                ..Default::default()
            };
            image.symbols.insert("root".to_string(), 0);
            image.export_funcs.push(ExportEntry {
                name: "root".to_string(),
                offset: 0,
            });
            image.export_vars.push(ExportEntry {
                name: "gState".to_string(),
                offset: 0,
            });
            image.pragmas.push(Pragma {
                key: "version".to_string(),
                value: "1".to_string(),
            });
            image.functions.insert(
                "root".to_string(),
                FunctionExtent {
                    offset: 0,
                    size: image.code.len() as u64,
                },
            );
            if module.has_linked_modules() {
                image.symbols.insert("linked".to_string(), 4);
            }
            Ok(image)
        }
    }

    fn new_script() -> Script {
        Script::new(Box::new(TestCompiler::new()))
    }

    fn identity_in(dir: &Path) -> CacheIdentity {
        CacheIdentity::new("fountain", 1700000000, Crc32::from_bytes(BC_MAGIC), dir)
    }

    #[test]
    fn ingest_then_compile_resolves_compiled() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = new_script();

        script.ingest_bitcode(BC_MAGIC, &identity_in(dir.path())).unwrap();
        assert!(!script.is_resolved());

        script.compile().unwrap();
        assert!(script.is_resolved());
        assert!(!script.backend().unwrap().is_from_cache());
        assert_eq!(script.take_error(), None);
    }

    #[test]
    fn empty_bitcode_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = new_script();
        let err = script
            .ingest_bitcode(b"", &identity_in(dir.path()))
            .unwrap_err();
        assert_eq!(err, ErrorCode::InvalidBitcode);
        assert_eq!(script.take_error(), Some(ErrorCode::InvalidBitcode));
        assert_eq!(script.take_error(), None);
    }

    #[test]
    fn garbage_bitcode_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = new_script();
        let err = script
            .ingest_bitcode(b"0123456789", &identity_in(dir.path()))
            .unwrap_err();
        assert_eq!(err, ErrorCode::InvalidBitcode);
    }

    #[test]
    fn compile_without_ingest_is_invalid_state() {
        let mut script = new_script();
        assert_eq!(script.compile().unwrap_err(), ErrorCode::InvalidState);
    }

    #[test]
    fn compile_twice_is_invalid_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = new_script();
        script.ingest_bitcode(BC_MAGIC, &identity_in(dir.path())).unwrap();
        script.compile().unwrap();
        assert_eq!(script.compile().unwrap_err(), ErrorCode::InvalidState);
    }

    #[test]
    fn ingest_after_resolve_is_invalid_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = new_script();
        script.ingest_bitcode(BC_MAGIC, &identity_in(dir.path())).unwrap();
        script.compile().unwrap();
        assert_eq!(
            script
                .ingest_bitcode(BC_MAGIC, &identity_in(dir.path()))
                .unwrap_err(),
            ErrorCode::InvalidState
        );
    }

    #[test]
    fn cache_miss_is_soft_and_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = new_script();
        let identity = identity_in(dir.path());

        assert_eq!(
            script.load_from_cache(&identity).unwrap_err(),
            ErrorCode::CacheMiss
        );
        assert!(!script.is_resolved());

        // Fallback path still works.
        script.ingest_bitcode(BC_MAGIC, &identity).unwrap();
        script.compile().unwrap();
        assert!(script.is_resolved());
    }

    #[test]
    fn valid_cache_entry_short_circuits_compilation() {
        let dir = tempfile::tempdir().unwrap();
        let identity = identity_in(dir.path());

        // Produce and persist an artifact, as the host would after a compile.
        let image = TestCompiler::new()
            .compile(&PendingModule::new(BC_MAGIC.to_vec()), None)
            .unwrap();
        write_artifact(&identity, &image).unwrap();

        let mut script = new_script();
        script.ingest_bitcode(BC_MAGIC, &identity).unwrap();
        assert!(script.is_resolved());
        assert!(script.backend().unwrap().is_from_cache());
        assert_eq!(script.take_error(), None);
    }

    #[test]
    fn stale_mod_time_forces_recompilation() {
        let dir = tempfile::tempdir().unwrap();
        let identity = identity_in(dir.path());
        let image = TestCompiler::new()
            .compile(&PendingModule::new(BC_MAGIC.to_vec()), None)
            .unwrap();
        write_artifact(&identity, &image).unwrap();

        let stale = CacheIdentity::new(
            "fountain",
            identity.source_mod_time() + 1,
            identity.source_crc(),
            dir.path(),
        );
        let mut script = new_script();
        script.ingest_bitcode(BC_MAGIC, &stale).unwrap();
        assert!(!script.is_resolved(), "mod-time mismatch must not hit");
        script.compile().unwrap();
        assert!(!script.backend().unwrap().is_from_cache());
    }

    #[test]
    fn stale_crc_forces_recompilation() {
        let dir = tempfile::tempdir().unwrap();
        let identity = identity_in(dir.path());
        let image = TestCompiler::new()
            .compile(&PendingModule::new(BC_MAGIC.to_vec()), None)
            .unwrap();
        write_artifact(&identity, &image).unwrap();

        let stale = CacheIdentity::new(
            "fountain",
            identity.source_mod_time(),
            Crc32::from_raw(identity.source_crc().as_u32() ^ 1),
            dir.path(),
        );
        let mut script = new_script();
        script.ingest_bitcode(BC_MAGIC, &stale).unwrap();
        assert!(!script.is_resolved(), "CRC mismatch must not hit");
    }

    #[test]
    fn corrupt_payload_behind_valid_header_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let identity = identity_in(dir.path());
        let image = TestCompiler::new()
            .compile(&PendingModule::new(BC_MAGIC.to_vec()), None)
            .unwrap();
        let path = write_artifact(&identity, &image).unwrap();

        // Corrupt the payload; the header still reads as a valid entry.
        let mut raw = std::fs::read(&path).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        std::fs::write(&path, &raw).unwrap();

        let mut script = new_script();
        let err = script.ingest_bitcode(BC_MAGIC, &identity).unwrap_err();
        assert_eq!(err, ErrorCode::CacheMiss);
        assert!(!script.is_resolved());

        // The bitcode was retained; the documented fallback still compiles.
        script.compile().unwrap();
        assert!(script.is_resolved());
        assert_eq!(script.take_error(), Some(ErrorCode::CacheMiss));
    }

    #[test]
    fn link_bitcode_merges_into_pending() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = new_script();
        script.ingest_bitcode(BC_MAGIC, &identity_in(dir.path())).unwrap();
        script.link_bitcode(b"BC\xc0\xde-extra").unwrap();
        script.compile().unwrap();
        assert!(script.lookup("linked").is_some());
    }

    #[test]
    fn link_before_ingest_is_invalid_state() {
        let mut script = new_script();
        assert_eq!(
            script.link_bitcode(BC_MAGIC).unwrap_err(),
            ErrorCode::InvalidState
        );
    }

    #[test]
    fn link_after_resolve_is_invalid_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = new_script();
        script.ingest_bitcode(BC_MAGIC, &identity_in(dir.path())).unwrap();
        script.compile().unwrap();
        assert_eq!(
            script.link_bitcode(BC_MAGIC).unwrap_err(),
            ErrorCode::InvalidState
        );
    }

    #[test]
    fn linking_invalidates_cache_identity() {
        let dir = tempfile::tempdir().unwrap();
        let identity = identity_in(dir.path());
        let image = TestCompiler::new()
            .compile(&PendingModule::new(BC_MAGIC.to_vec()), None)
            .unwrap();
        write_artifact(&identity, &image).unwrap();

        // Ingest with a mismatched identity so the entry is not taken,
        // then link a second module.
        let other = CacheIdentity::new(
            "fountain",
            identity.source_mod_time() + 1,
            identity.source_crc(),
            dir.path(),
        );
        let mut script = new_script();
        script.ingest_bitcode(BC_MAGIC, &other).unwrap();
        script.link_bitcode(b"BC\xc0\xde-extra").unwrap();

        // A load against the (otherwise valid) stored identity must miss.
        assert_eq!(
            script.load_from_cache(&identity).unwrap_err(),
            ErrorCode::CacheMiss
        );
        script.compile().unwrap();
        assert!(!script.backend().unwrap().is_from_cache());
    }

    #[test]
    fn compile_failure_latches_and_keeps_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = Script::new(Box::new(TestCompiler::with_external("rsGetDt")));
        script.ingest_bitcode(BC_MAGIC, &identity_in(dir.path())).unwrap();

        let err = script.compile().unwrap_err();
        assert_eq!(err, ErrorCode::CompileError);
        assert!(script
            .compiler_error_message()
            .contains("undefined reference to 'rsGetDt'"));
        assert!(!script.is_resolved());

        assert_eq!(script.take_error(), Some(ErrorCode::CompileError));
        assert_eq!(script.take_error(), None);
    }

    #[test]
    fn resolver_hook_reaches_the_compiler() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = Script::new(Box::new(TestCompiler::with_external("rsGetDt")));
        script.ingest_bitcode(BC_MAGIC, &identity_in(dir.path())).unwrap();

        static HOST_FN: u8 = 0xc3;
        let resolver: SymbolResolver = Arc::new(|name| {
            (name == "rsGetDt").then_some(&HOST_FN as *const u8)
        });
        script.register_symbol_callback(resolver).unwrap();
        script.compile().unwrap();
        assert!(script.is_resolved());
    }

    #[test]
    fn register_callback_after_resolve_is_invalid_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = new_script();
        script.ingest_bitcode(BC_MAGIC, &identity_in(dir.path())).unwrap();
        script.compile().unwrap();
        let resolver: SymbolResolver = Arc::new(|_| None);
        assert_eq!(
            script.register_symbol_callback(resolver).unwrap_err(),
            ErrorCode::InvalidState
        );
    }

    #[test]
    fn queries_before_resolution_are_benign() {
        let script = new_script();
        assert_eq!(script.lookup("root"), None);
        let mut addrs = [std::ptr::null(); 4];
        assert_eq!(script.export_vars(&mut addrs), 0);
        assert_eq!(script.export_funcs(&mut addrs), 0);
        assert!(addrs.iter().all(|p| p.is_null()));
        let mut pragmas = vec![Pragma::default(); 4];
        assert_eq!(script.pragmas(&mut pragmas), 0);
        let mut names = vec![String::new(); 4];
        assert_eq!(script.functions(&mut names), 0);
        assert_eq!(script.function_binary("root"), None);
    }

    #[test]
    fn queries_after_compile() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = new_script();
        script.ingest_bitcode(BC_MAGIC, &identity_in(dir.path())).unwrap();
        script.compile().unwrap();

        assert!(script.lookup("root").is_some());
        assert_eq!(script.lookup("absent"), None);

        let mut pragmas = vec![Pragma::default(); 4];
        assert_eq!(script.pragmas(&mut pragmas), 1);
        assert_eq!(pragmas[0].key, "version");

        let (_base, len) = script.function_binary("root").unwrap();
        assert_eq!(len, BC_MAGIC.len());
    }

    #[test]
    fn set_error_first_wins_and_clears_on_take() {
        let mut script = new_script();
        script.set_error(ErrorCode::ConfigError);
        script.set_error(ErrorCode::CompileError);
        assert_eq!(script.take_error(), Some(ErrorCode::ConfigError));
        assert_eq!(script.take_error(), None);
    }

    #[test]
    fn drop_without_errors_leaves_cleanup_alone() {
        let sink = Arc::new(DiagnosticSink::new());
        let cleanup = Arc::new(CleanupRegistry::new());
        let ran = Arc::new(AtomicUsize::new(0));

        {
            let mut script = new_script();
            script.attach_teardown(Arc::clone(&sink), Arc::clone(&cleanup));
            let ran = Arc::clone(&ran);
            cleanup.register(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(cleanup.len(), 1);
    }

    #[test]
    fn drop_after_error_runs_cleanup() {
        let sink = Arc::new(DiagnosticSink::new());
        let cleanup = Arc::new(CleanupRegistry::new());
        let ran = Arc::new(AtomicUsize::new(0));

        {
            let dir = tempfile::tempdir().unwrap();
            let mut script = Script::new(Box::new(TestCompiler::with_external("missing")));
            script.attach_teardown(Arc::clone(&sink), Arc::clone(&cleanup));
            let ran = Arc::clone(&ran);
            cleanup.register(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            });

            script.ingest_bitcode(BC_MAGIC, &identity_in(dir.path())).unwrap();
            assert!(script.compile().is_err());
            // Even after the caller drains the slot, the history remains.
            assert_eq!(script.take_error(), Some(ErrorCode::CompileError));
        }

        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert!(sink.has_errors(), "compile failure was routed to the sink");
    }
}
