//! The two-shape artifact backend behind the query surface.

use bitc_cache::{ArtifactImage, Pragma};

/// A native artifact produced by the compiling collaborator in this run.
#[derive(Debug)]
pub struct CompiledArtifact {
    image: ArtifactImage,
}

impl CompiledArtifact {
    /// Wraps a freshly generated image.
    pub fn new(image: ArtifactImage) -> Self {
        Self { image }
    }
}

/// A native artifact reconstructed from a serialized cache entry.
#[derive(Debug)]
pub struct CachedArtifact {
    image: ArtifactImage,
}

impl CachedArtifact {
    /// Wraps an image deserialized from disk.
    pub fn new(image: ArtifactImage) -> Self {
        Self { image }
    }
}

/// The resolved backend of a script: freshly compiled or loaded from cache.
///
/// The two shapes hold the same logical tables and differ only in how they
/// were produced, so this is a tagged sum, not a trait object. The tag is
/// fixed for the life of the script; callers observe no behavioral
/// difference between the variants beyond provenance.
#[derive(Debug)]
pub enum ArtifactBackend {
    /// Generated from bitcode in this run.
    Compiled(CompiledArtifact),
    /// Deserialized from a prior on-disk artifact.
    Cached(CachedArtifact),
}

impl ArtifactBackend {
    /// The provenance-independent view of the artifact's tables.
    ///
    /// Hosts persisting a freshly compiled script serialize this image.
    pub fn image(&self) -> &ArtifactImage {
        match self {
            ArtifactBackend::Compiled(artifact) => &artifact.image,
            ArtifactBackend::Cached(artifact) => &artifact.image,
        }
    }

    /// Returns `true` if this backend was loaded from cache.
    pub fn is_from_cache(&self) -> bool {
        match self {
            ArtifactBackend::Compiled(_) => false,
            ArtifactBackend::Cached(_) => true,
        }
    }

    /// Resolves a symbol name to its address within the native image.
    pub fn lookup(&self, name: &str) -> Option<*const u8> {
        let image = self.image();
        let offset = *image.symbols.get(name)?;
        self.address_at(offset)
    }

    /// Fills `out` with exported-variable addresses, returning the true count.
    ///
    /// At most `out.len()` entries are written even when more exist; the
    /// return value always reports the full table size so truncation is
    /// detectable.
    pub fn export_vars(&self, out: &mut [*const u8]) -> usize {
        let image = self.image();
        for (slot, entry) in out.iter_mut().zip(&image.export_vars) {
            *slot = self.address_at(entry.offset).unwrap_or(std::ptr::null());
        }
        image.export_vars.len()
    }

    /// Fills `out` with exported-function addresses, returning the true count.
    pub fn export_funcs(&self, out: &mut [*const u8]) -> usize {
        let image = self.image();
        for (slot, entry) in out.iter_mut().zip(&image.export_funcs) {
            *slot = self.address_at(entry.offset).unwrap_or(std::ptr::null());
        }
        image.export_funcs.len()
    }

    /// Fills `out` with pragma entries, returning the true count.
    pub fn pragmas(&self, out: &mut [Pragma]) -> usize {
        let image = self.image();
        for (slot, pragma) in out.iter_mut().zip(&image.pragmas) {
            *slot = pragma.clone();
        }
        image.pragmas.len()
    }

    /// Fills `out` with function names, returning the true count.
    ///
    /// Names are written in sorted order so the enumeration is stable
    /// across runs and across the two backend shapes.
    pub fn functions(&self, out: &mut [String]) -> usize {
        let image = self.image();
        let mut names: Vec<&String> = image.functions.keys().collect();
        names.sort();
        for (slot, name) in out.iter_mut().zip(&names) {
            *slot = (*name).clone();
        }
        names.len()
    }

    /// Returns the base address and length of a named function's body.
    pub fn function_binary(&self, name: &str) -> Option<(*const u8, usize)> {
        let image = self.image();
        let extent = image.functions.get(name)?;
        let base = self.address_at(extent.offset)?;
        let end = extent.offset.checked_add(extent.size)?;
        if end as usize > image.code.len() {
            return None;
        }
        Some((base, extent.size as usize))
    }

    fn address_at(&self, offset: u64) -> Option<*const u8> {
        let image = self.image();
        let offset = offset as usize;
        if offset < image.code.len() {
            Some(image.code[offset..].as_ptr())
        } else {
            None
        }
    }
}
