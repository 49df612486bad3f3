//! Viewer error types

use thiserror::Error;

use sift_store::StoreError;

/// Errors in the viewer subsystem
#[derive(Debug, Error)]
pub enum ViewerError {
    /// No session registered under this id
    #[error("session not found: {id}")]
    SessionNotFound { id: u64 },

    /// A session with this id is already connected
    #[error("session already connected: {id}")]
    SessionExists { id: u64 },

    /// The transport signalled closure; terminal for this session only
    #[error("transport closed")]
    TransportClosed,

    /// Store failure bubbled out of a viewer operation
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ViewerError {
    /// Whether this is the terminal transport-closed signal
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::TransportClosed)
    }
}

/// Result type for viewer operations
pub type Result<T> = std::result::Result<T, ViewerError>;
