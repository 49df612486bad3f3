//! The shared splitter-active flag
//!
//! Lifecycle: disabled at startup, enabled by operator action, disabled
//! on shutdown. The gate is the in-process authority; a backend mirror
//! of the flag exists only as an audit record and is never read on the
//! hot path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide splitter-active flag
///
/// Cloned into the splitter task and the connection manager; both see
/// the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct SplitterGate {
    enabled: Arc<AtomicBool>,
}

impl SplitterGate {
    /// Create a gate in the disabled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the splitter
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Disable the splitter (also the cooperative stop signal on shutdown)
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}
