//! Operations routes
//!
//! Health and status for monitoring; no authentication.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use sift_splitter::SplitterSnapshot;

use crate::error::Result;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server status
    pub status: &'static str,
    /// Uptime in seconds
    pub uptime_secs: u64,
    /// Live viewer sessions
    pub sessions: usize,
    /// Whether the splitter gate is enabled
    pub splitter_active: bool,
    /// Splitter counters, when a splitter is running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splitter: Option<SplitterSnapshot>,
    /// Backend health snapshot
    pub backend: serde_json::Value,
}

/// Operations routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

/// Health check endpoint
///
/// GET /health
///
/// Reports uptime, session count, splitter state, and the backend
/// snapshot that also rides along in heartbeat pings.
async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let backend = state.store.health().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        sessions: state.manager.session_count(),
        splitter_active: state.manager.splitter_active(),
        splitter: state.splitter_metrics.as_ref().map(|m| m.snapshot()),
        backend,
    }))
}
