//! Error codes and the latched error slot.

/// The enumerated error codes a script operation can fail with.
///
/// None of these abort the process; every fallible operation returns a
/// status and latches its code in the script's [`ErrorSlot`].
/// [`CacheMiss`](ErrorCode::CacheMiss) is a soft condition: the caller is
/// expected to fall back to compilation, not to treat it as a hard failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorCode {
    /// The bitcode input was empty or structurally malformed.
    #[error("invalid bitcode")]
    InvalidBitcode,

    /// The operation is illegal in the script's current lifecycle state.
    #[error("operation illegal in current script state")]
    InvalidState,

    /// No usable cached artifact was found; fall back to compilation.
    #[error("no usable cached artifact")]
    CacheMiss,

    /// The compiling collaborator reported a failure; detailed text is
    /// available via `Script::compiler_error_message`.
    #[error("compilation failed")]
    CompileError,

    /// A configuration collaborator failed (e.g. unsupported target triple).
    #[error("collaborator configuration failed")]
    ConfigError,
}

/// A latched single-slot error channel.
///
/// A single-value mailbox with oldest-unread-wins semantics: setting a code
/// while the slot already holds one is a no-op, and taking the value clears
/// the slot. The slot additionally remembers whether *any* error was ever
/// recorded, surviving reads; script teardown consults that history to
/// decide whether cleanup handlers must run.
#[derive(Debug, Default)]
pub struct ErrorSlot {
    current: Option<ErrorCode>,
    recorded_any: bool,
}

impl ErrorSlot {
    /// Creates a clear error slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches an error code if the slot is clear; first error wins.
    pub fn set(&mut self, code: ErrorCode) {
        self.recorded_any = true;
        if self.current.is_none() {
            self.current = Some(code);
        }
    }

    /// Returns the latched code, if any, and clears the slot.
    pub fn take(&mut self) -> Option<ErrorCode> {
        self.current.take()
    }

    /// Returns `true` if no unread error is latched.
    pub fn is_clear(&self) -> bool {
        self.current.is_none()
    }

    /// Returns `true` if any error was ever recorded, read or not.
    pub fn recorded_any(&self) -> bool {
        self.recorded_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_slot_is_clear() {
        let mut slot = ErrorSlot::new();
        assert!(slot.is_clear());
        assert!(!slot.recorded_any());
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn take_returns_then_clears() {
        let mut slot = ErrorSlot::new();
        slot.set(ErrorCode::CompileError);
        assert_eq!(slot.take(), Some(ErrorCode::CompileError));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn first_error_wins() {
        let mut slot = ErrorSlot::new();
        slot.set(ErrorCode::InvalidBitcode);
        slot.set(ErrorCode::CompileError);
        assert_eq!(slot.take(), Some(ErrorCode::InvalidBitcode));
    }

    #[test]
    fn slot_reusable_after_take() {
        let mut slot = ErrorSlot::new();
        slot.set(ErrorCode::CacheMiss);
        assert_eq!(slot.take(), Some(ErrorCode::CacheMiss));
        slot.set(ErrorCode::InvalidState);
        assert_eq!(slot.take(), Some(ErrorCode::InvalidState));
    }

    #[test]
    fn recorded_any_survives_take() {
        let mut slot = ErrorSlot::new();
        slot.set(ErrorCode::CacheMiss);
        let _ = slot.take();
        assert!(slot.recorded_any());
        assert!(slot.is_clear());
    }

    #[test]
    fn display_messages() {
        assert_eq!(ErrorCode::InvalidBitcode.to_string(), "invalid bitcode");
        assert_eq!(
            ErrorCode::CacheMiss.to_string(),
            "no usable cached artifact"
        );
    }
}
