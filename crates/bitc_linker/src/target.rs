//! Target-triple resolution against the registered target table.

use crate::error::ConfigError;

/// Instruction-set architectures the linker backend can emit for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 32-bit ARM (armv5 through armv7).
    Arm,
    /// 64-bit ARM.
    Aarch64,
    /// 32-bit x86.
    X86,
    /// 64-bit x86.
    X86_64,
    /// 32-bit little-endian MIPS.
    Mipsel,
}

/// A registered link target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// Architecture component prefixes this target claims (e.g. `"armv7"`).
    pub arch_prefixes: &'static [&'static str],
    /// The architecture this target emits for.
    pub arch: Arch,
    /// Pointer width in bits.
    pub pointer_width: u32,
}

/// All targets the linker backend was built with.
static REGISTERED_TARGETS: &[Target] = &[
    Target {
        arch_prefixes: &["arm", "armv5", "armv6", "armv7", "thumbv7"],
        arch: Arch::Arm,
        pointer_width: 32,
    },
    Target {
        arch_prefixes: &["aarch64", "arm64"],
        arch: Arch::Aarch64,
        pointer_width: 64,
    },
    Target {
        arch_prefixes: &["i386", "i486", "i586", "i686", "x86"],
        arch: Arch::X86,
        pointer_width: 32,
    },
    Target {
        arch_prefixes: &["x86_64", "amd64"],
        arch: Arch::X86_64,
        pointer_width: 64,
    },
    Target {
        arch_prefixes: &["mipsel", "mips"],
        arch: Arch::Mipsel,
        pointer_width: 32,
    },
];

/// Resolves a target triple to a registered target.
///
/// Matches on the architecture component (the part before the first `-`).
/// Fails closed: an unrecognized architecture yields a descriptive
/// [`ConfigError::UnsupportedTriple`] rather than a guessed default.
pub fn lookup_target(triple: &str) -> Result<&'static Target, ConfigError> {
    let arch_component = triple.split('-').next().unwrap_or("");
    if arch_component.is_empty() {
        return Err(ConfigError::UnsupportedTriple {
            triple: triple.to_string(),
            reason: "empty architecture component".to_string(),
        });
    }

    // Longest prefix wins so "armv7" isn't claimed by a bare "arm" entry
    // registered for a different target.
    let mut best: Option<(&'static Target, usize)> = None;
    for target in REGISTERED_TARGETS {
        for prefix in target.arch_prefixes {
            if arch_component.starts_with(prefix) {
                let len = prefix.len();
                if best.map_or(true, |(_, best_len)| len > best_len) {
                    best = Some((target, len));
                }
            }
        }
    }

    match best {
        Some((target, _)) => Ok(target),
        None => Err(ConfigError::UnsupportedTriple {
            triple: triple.to_string(),
            reason: "no registered target matches".to_string(),
        }),
    }
}
