//! Route handler tests
//!
//! Drive the assembled router in-process with tower's `oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use sift_splitter::SplitterGate;
use sift_store::{LogStore, MemoryStore};
use sift_viewer::{ConnectionManager, ViewerConfig};

use crate::state::AppState;

use super::*;

fn test_state() -> (Arc<MemoryStore>, Arc<ConnectionManager>, AppState) {
    let store = Arc::new(MemoryStore::new());
    let manager = Arc::new(ConnectionManager::new(
        Arc::clone(&store) as Arc<dyn LogStore>,
        SplitterGate::new(),
        ViewerConfig::default(),
    ));
    let state = AppState::new(
        Arc::clone(&manager),
        Arc::clone(&store) as Arc<dyn LogStore>,
    );
    (store, manager, state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_backend_snapshot() {
    let (_store, _manager, state) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sessions"], 0);
    assert_eq!(body["splitter_active"], false);
    assert_eq!(body["backend"]["backend"], "memory");
}

#[tokio::test]
async fn test_allocate_session_id() {
    let (_store, _manager, state) = test_state();
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(Request::post("/sessions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["session_id"], 1);

    let response = app
        .oneshot(Request::post("/sessions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await["session_id"], 2);
}

#[tokio::test]
async fn test_splitter_activation_round_trip() {
    let (_store, manager, state) = test_state();
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::post("/streams/splitter/activate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["active"], true);
    assert!(manager.splitter_active());

    let response = app
        .oneshot(
            Request::post("/streams/splitter/deactivate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await["active"], false);
    assert!(!manager.splitter_active());
}

#[tokio::test]
async fn test_refresh_and_list_topics() {
    let (store, _manager, state) = test_state();
    // One observed severity with a materialized topic.
    store
        .append("error", sift_store::Fields::new(), None)
        .await
        .unwrap();
    store
        .counter_incr(sift_protocol::SEVERITY_COUNTER_SET, "error", 1)
        .await
        .unwrap();

    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(Request::post("/streams/refresh").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await["topics"], serde_json::json!(["error"]));

    let response = app
        .oneshot(Request::get("/streams").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await["topics"], serde_json::json!(["error"]));
}

#[tokio::test]
async fn test_subscription_mutation_routes() {
    let (_store, manager, state) = test_state();
    manager.connect(7).await.unwrap();
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::put("/sessions/7/streams/error")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["topic"], "error");
    assert!(manager.session(7).unwrap().is_subscribed("error"));

    let response = app
        .oneshot(
            Request::delete("/sessions/7/streams/error")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!manager.session(7).unwrap().is_subscribed("error"));
}

#[tokio::test]
async fn test_subscription_unknown_session_is_404() {
    let (_store, _manager, state) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::put("/sessions/99/streams/error")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_timeseries_range_route() {
    let (store, _manager, state) = test_state();
    store
        .timeseries_add(
            "ts:error",
            1000,
            1.0,
            &[
                ("log_level".to_string(), "error".to_string()),
                ("type".to_string(), "logs".to_string()),
            ],
        )
        .await
        .unwrap();

    let app = build_router(state);
    let response = app
        .oneshot(
            Request::post("/timeseries/range")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"aggregation":"count","bucket_ms":1000}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["name"], "error");
    assert_eq!(body[0]["data"][0]["y"], 1.0);
}

#[tokio::test]
async fn test_archive_lookup() {
    let (store, _manager, state) = test_state();
    store
        .doc_set("logs:0:1-0", &serde_json::json!({"message": "kept"}))
        .await
        .unwrap();

    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(Request::get("/archive/0/1-0").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "kept");

    let response = app
        .oneshot(Request::get("/archive/0/9-9").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
