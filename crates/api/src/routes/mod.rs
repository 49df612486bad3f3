//! API routes
//!
//! Domain-grouped HTTP route handlers plus the WebSocket endpoint.

pub mod ops;
pub mod query;
pub mod streams;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the complete router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Operations routes (health - no auth)
        .merge(ops::routes())
        // Stream discovery, splitter control, session subscriptions
        .merge(streams::routes())
        // Time-series range and archive lookups
        .merge(query::routes())
        // Live viewer endpoint
        .route("/ws/{session_id}", get(ws::ws_handler))
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
