//! Scoped registry of teardown callbacks.

use std::sync::Mutex;

/// A scoped registry of cleanup callbacks to run before abnormal teardown.
///
/// Collaborators that create transient resources (temporary object files,
/// partially written cache artifacts) register a handler here instead of
/// installing process-wide signal handlers. When a script that recorded at
/// least one error is dropped, it drains this registry so those resources
/// are removed before its own memory is released.
///
/// Handlers run in reverse registration order, mirroring how nested resources
/// are usually acquired. Running is idempotent: a second
/// [`run_all`](Self::run_all) finds an empty registry and does nothing.
pub struct CleanupRegistry {
    handlers: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
}

impl CleanupRegistry {
    /// Creates a new empty cleanup registry.
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Registers a cleanup handler.
    pub fn register(&self, handler: impl FnOnce() + Send + 'static) {
        let mut handlers = self.handlers.lock().unwrap();
        handlers.push(Box::new(handler));
    }

    /// Runs and removes all registered handlers, newest first.
    ///
    /// Returns the number of handlers that ran.
    pub fn run_all(&self) -> usize {
        let drained: Vec<_> = {
            let mut handlers = self.handlers.lock().unwrap();
            handlers.drain(..).collect()
        };
        let count = drained.len();
        for handler in drained.into_iter().rev() {
            handler();
        }
        count
    }

    /// Returns the number of pending handlers.
    pub fn len(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }

    /// Returns `true` if no handlers are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CleanupRegistry {
    fn default() -> Self {
        Self::new()
    }
}
