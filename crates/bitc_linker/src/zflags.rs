//! `-z`-style linker behavior and hardening toggles.

bitflags::bitflags! {
    /// Bit-flag set of fine-grained linker behavior toggles.
    ///
    /// Callers hand the whole set over at once via
    /// [`LinkerConfig::set_z_flags`](crate::LinkerConfig::set_z_flags);
    /// [`expand`](Self::expand) turns it into the option list the backend
    /// consumes, emitting the explicit negative form for the four toggles
    /// that have one.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ZFlags: u32 {
        /// Combine multiple relocation sections.
        const COMB_RELOC = 1 << 0;
        /// Report unresolved symbol references.
        const DEFS = 1 << 1;
        /// Mark the stack as executable.
        const EXEC_STACK = 1 << 2;
        /// Run this object's initializers before all others.
        const INIT_FIRST = 1 << 3;
        /// Allow the object to interpose symbols.
        const INTERPOSE = 1 << 4;
        /// Mark the object as a load filter.
        const LOAD_FLTR = 1 << 5;
        /// Allow multiple symbol definitions.
        const MUL_DEFS = 1 << 6;
        /// Forbid copy relocations.
        const NO_COPY_RELOC = 1 << 7;
        /// Ignore default library search paths.
        const NO_DEFAULT_LIB = 1 << 8;
        /// Mark the object as non-deletable at runtime.
        const NO_DELETE = 1 << 9;
        /// Forbid loading via `dlopen`.
        const NO_DLOPEN = 1 << 10;
        /// Exclude the object from core dumps.
        const NO_DUMP = 1 << 11;
        /// Make relocated segments read-only after startup.
        const RELRO = 1 << 12;
        /// Use lazy binding (the unset form binds at load time).
        const LAZY = 1 << 13;
        /// Resolve `$ORIGIN` in runtime paths.
        const ORIGIN = 1 << 14;
    }
}

/// A single linker option as consumed by the backend.
///
/// Toggles with an explicit "off" spelling appear in both polarities;
/// pure opt-ins are only emitted when their flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZOption {
    /// Combine relocation sections.
    CombReloc,
    /// Do not combine relocation sections.
    NoCombReloc,
    /// Report unresolved symbol references.
    Defs,
    /// Executable stack.
    ExecStack,
    /// Non-executable stack.
    NoExecStack,
    /// Initialize this object first.
    InitFirst,
    /// Allow symbol interposition.
    Interpose,
    /// Mark as a load filter.
    LoadFltr,
    /// Allow multiple definitions.
    MulDefs,
    /// Forbid copy relocations.
    NoCopyReloc,
    /// Ignore default library paths.
    NoDefaultLib,
    /// Non-deletable at runtime.
    NoDelete,
    /// Forbid `dlopen`.
    NoDlopen,
    /// Exclude from core dumps.
    NoDump,
    /// Read-only relocated segments.
    Relro,
    /// Writable relocated segments.
    NoRelro,
    /// Lazy binding.
    Lazy,
    /// Bind at load time.
    Now,
    /// Resolve `$ORIGIN`.
    Origin,
}

impl ZFlags {
    /// Expands the flag set into the backend's option list.
    pub fn expand(self) -> Vec<ZOption> {
        let mut options = Vec::new();

        if self.contains(ZFlags::COMB_RELOC) {
            options.push(ZOption::CombReloc);
        } else {
            options.push(ZOption::NoCombReloc);
        }

        if self.contains(ZFlags::DEFS) {
            options.push(ZOption::Defs);
        }

        if self.contains(ZFlags::EXEC_STACK) {
            options.push(ZOption::ExecStack);
        } else {
            options.push(ZOption::NoExecStack);
        }

        if self.contains(ZFlags::INIT_FIRST) {
            options.push(ZOption::InitFirst);
        }

        if self.contains(ZFlags::INTERPOSE) {
            options.push(ZOption::Interpose);
        }

        if self.contains(ZFlags::LOAD_FLTR) {
            options.push(ZOption::LoadFltr);
        }

        if self.contains(ZFlags::MUL_DEFS) {
            options.push(ZOption::MulDefs);
        }

        if self.contains(ZFlags::NO_COPY_RELOC) {
            options.push(ZOption::NoCopyReloc);
        }

        if self.contains(ZFlags::NO_DEFAULT_LIB) {
            options.push(ZOption::NoDefaultLib);
        }

        if self.contains(ZFlags::NO_DELETE) {
            options.push(ZOption::NoDelete);
        }

        if self.contains(ZFlags::NO_DLOPEN) {
            options.push(ZOption::NoDlopen);
        }

        if self.contains(ZFlags::NO_DUMP) {
            options.push(ZOption::NoDump);
        }

        if self.contains(ZFlags::RELRO) {
            options.push(ZOption::Relro);
        } else {
            options.push(ZOption::NoRelro);
        }

        if self.contains(ZFlags::LAZY) {
            options.push(ZOption::Lazy);
        } else {
            options.push(ZOption::Now);
        }

        if self.contains(ZFlags::ORIGIN) {
            options.push(ZOption::Origin);
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_flags_emit_negative_defaults() {
        let options = ZFlags::empty().expand();
        assert!(options.contains(&ZOption::NoCombReloc));
        assert!(options.contains(&ZOption::NoExecStack));
        assert!(options.contains(&ZOption::NoRelro));
        assert!(options.contains(&ZOption::Now));
        assert!(!options.contains(&ZOption::Defs));
        assert!(!options.contains(&ZOption::Origin));
    }

    #[test]
    fn positive_flags_replace_negatives() {
        let options = (ZFlags::RELRO | ZFlags::LAZY).expand();
        assert!(options.contains(&ZOption::Relro));
        assert!(!options.contains(&ZOption::NoRelro));
        assert!(options.contains(&ZOption::Lazy));
        assert!(!options.contains(&ZOption::Now));
    }

    #[test]
    fn opt_ins_only_when_set() {
        let options = (ZFlags::DEFS | ZFlags::NO_DLOPEN | ZFlags::ORIGIN).expand();
        assert!(options.contains(&ZOption::Defs));
        assert!(options.contains(&ZOption::NoDlopen));
        assert!(options.contains(&ZOption::Origin));
        assert!(!options.contains(&ZOption::InitFirst));
        assert!(!options.contains(&ZOption::MulDefs));
    }

    #[test]
    fn all_flags_emit_every_positive_form() {
        let options = ZFlags::all().expand();
        for opt in [
            ZOption::CombReloc,
            ZOption::Defs,
            ZOption::ExecStack,
            ZOption::InitFirst,
            ZOption::Interpose,
            ZOption::LoadFltr,
            ZOption::MulDefs,
            ZOption::NoCopyReloc,
            ZOption::NoDefaultLib,
            ZOption::NoDelete,
            ZOption::NoDlopen,
            ZOption::NoDump,
            ZOption::Relro,
            ZOption::Lazy,
            ZOption::Origin,
        ] {
            assert!(options.contains(&opt), "{opt:?} missing");
        }
    }
}
