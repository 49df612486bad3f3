//! Application state
//!
//! Shared state for the HTTP handlers: the connection manager, the
//! store handle for direct queries, and the splitter metrics.

use std::sync::Arc;
use std::time::Instant;

use sift_splitter::SplitterMetrics;
use sift_store::LogStore;
use sift_viewer::ConnectionManager;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle and topic discovery authority
    pub manager: Arc<ConnectionManager>,
    /// Direct store handle for health, archive, and range queries
    pub store: Arc<dyn LogStore>,
    /// Splitter metrics for the ops surface, when a splitter runs
    pub splitter_metrics: Option<Arc<SplitterMetrics>>,
    /// Server start time for uptime reporting
    pub started: Instant,
}

impl AppState {
    pub fn new(manager: Arc<ConnectionManager>, store: Arc<dyn LogStore>) -> Self {
        Self {
            manager,
            store,
            splitter_metrics: None,
            started: Instant::now(),
        }
    }

    /// Attach splitter metrics for the ops endpoints
    pub fn with_splitter_metrics(mut self, metrics: Arc<SplitterMetrics>) -> Self {
        self.splitter_metrics = Some(metrics);
        self
    }

    /// Seconds since the server started
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
