//! Splitter metrics
//!
//! Relaxed atomics on the hot path, snapshotted for the ops surface.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the stream splitter
#[derive(Debug, Default)]
pub struct SplitterMetrics {
    /// Non-empty batches read from the raw topic
    pub batches_read: AtomicU64,

    /// Entries classified and republished
    pub entries_split: AtomicU64,

    /// Entries dropped for missing/unparseable severity
    pub entries_malformed: AtomicU64,

    /// Store errors that aborted a batch
    pub store_errors: AtomicU64,
}

impl SplitterMetrics {
    pub const fn new() -> Self {
        Self {
            batches_read: AtomicU64::new(0),
            entries_split: AtomicU64::new(0),
            entries_malformed: AtomicU64::new(0),
            store_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_batch(&self) {
        self.batches_read.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_split(&self) {
        self.entries_split.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_malformed(&self) {
        self.entries_malformed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time snapshot of all counters
    pub fn snapshot(&self) -> SplitterSnapshot {
        SplitterSnapshot {
            batches_read: self.batches_read.load(Ordering::Relaxed),
            entries_split: self.entries_split.load(Ordering::Relaxed),
            entries_malformed: self.entries_malformed.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`SplitterMetrics`]
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct SplitterSnapshot {
    pub batches_read: u64,
    pub entries_split: u64,
    pub entries_malformed: u64,
    pub store_errors: u64,
}
