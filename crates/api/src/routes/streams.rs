//! Stream and session control routes
//!
//! The operator surface the viewer core reacts to: topic discovery,
//! splitter activation, session id allocation, and per-session
//! subscription mutation.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;

use crate::error::Result;
use crate::state::AppState;

/// Known topics response
#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    /// Currently known severity topics
    pub topics: Vec<String>,
}

/// Splitter state response
#[derive(Debug, Serialize)]
pub struct SplitterResponse {
    /// Whether the splitter gate is now enabled
    pub active: bool,
}

/// Allocated session response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Id to connect with on `/ws/{session_id}`
    pub session_id: u64,
}

/// Subscription mutation response
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub session_id: u64,
    pub topic: String,
    /// Topics the session now reads from
    pub subscribed: usize,
}

/// Stream control routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/streams", get(list_topics))
        .route("/streams/refresh", post(refresh_topics))
        .route("/streams/splitter/activate", post(activate_splitter))
        .route("/streams/splitter/deactivate", post(deactivate_splitter))
        .route("/sessions", post(allocate_session))
        .route(
            "/sessions/{id}/streams/{topic}",
            put(add_subscription).delete(remove_subscription),
        )
}

/// GET /streams - last discovered severity snapshot
async fn list_topics(State(state): State<AppState>) -> Json<TopicsResponse> {
    Json(TopicsResponse {
        topics: state.manager.available_topics().into_iter().collect(),
    })
}

/// POST /streams/refresh - force a topic-discovery scan
async fn refresh_topics(State(state): State<AppState>) -> Result<Json<TopicsResponse>> {
    let topics = state.manager.refresh_topics().await?;
    Ok(Json(TopicsResponse {
        topics: topics.into_iter().collect(),
    }))
}

/// POST /streams/splitter/activate
///
/// Enables the splitter gate and strips the raw ingestion topic from
/// every connected session.
async fn activate_splitter(State(state): State<AppState>) -> Result<Json<SplitterResponse>> {
    state.manager.activate_splitter().await?;
    Ok(Json(SplitterResponse { active: true }))
}

/// POST /streams/splitter/deactivate
async fn deactivate_splitter(State(state): State<AppState>) -> Result<Json<SplitterResponse>> {
    state.manager.deactivate_splitter().await?;
    Ok(Json(SplitterResponse { active: false }))
}

/// POST /sessions - allocate an id for a new viewer connection
async fn allocate_session(State(state): State<AppState>) -> Result<Json<SessionResponse>> {
    let session_id = state.manager.allocate_session_id().await?;
    Ok(Json(SessionResponse { session_id }))
}

/// PUT /sessions/{id}/streams/{topic} - subscribe one session to a topic
async fn add_subscription(
    Path((id, topic)): Path<(u64, String)>,
    State(state): State<AppState>,
) -> Result<Json<SubscriptionResponse>> {
    state.manager.add_subscription(id, &topic)?;
    Ok(Json(subscription_response(&state, id, topic)))
}

/// DELETE /sessions/{id}/streams/{topic} - unsubscribe one session
async fn remove_subscription(
    Path((id, topic)): Path<(u64, String)>,
    State(state): State<AppState>,
) -> Result<Json<SubscriptionResponse>> {
    state.manager.remove_subscription(id, &topic)?;
    Ok(Json(subscription_response(&state, id, topic)))
}

fn subscription_response(state: &AppState, id: u64, topic: String) -> SubscriptionResponse {
    SubscriptionResponse {
        session_id: id,
        topic,
        subscribed: state
            .manager
            .session(id)
            .map(|s| s.subscription_count())
            .unwrap_or(0),
    }
}
