//! Log manager handle.
//!
//! The buffer pool keeps a reference to the log manager so that a future
//! write-ahead-log integration can enforce the flush-before-evict rule
//! (page_lsn <= flushed_lsn). The core forwards no calls to it today.

use std::sync::atomic::{AtomicBool, Ordering};

/// Opaque write-ahead-log handle.
pub struct LogManager {
    enabled: AtomicBool,
}

impl LogManager {
    /// Creates a log manager with logging disabled.
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
        }
    }

    /// Returns true if logging has been switched on.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Switches logging on or off.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
