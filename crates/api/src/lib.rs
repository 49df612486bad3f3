//! Sift API
//!
//! HTTP control surface and the WebSocket viewer endpoint, built on
//! Axum over the viewer and store crates.
//!
//! # Usage
//!
//! ```ignore
//! use sift_api::{build_router, AppState};
//!
//! let state = AppState::new(manager, store);
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! # Endpoints
//!
//! - `GET  /health` - uptime, session count, splitter state, backend snapshot
//! - `GET  /streams` - last discovered severity topics
//! - `POST /streams/refresh` - force a topic-discovery scan
//! - `POST /streams/splitter/activate` - enable splitting, strip the raw topic
//! - `POST /streams/splitter/deactivate`
//! - `POST /sessions` - allocate a viewer session id
//! - `PUT  /sessions/{id}/streams/{topic}` - add one subscription
//! - `DELETE /sessions/{id}/streams/{topic}` - remove one subscription
//! - `POST /timeseries/range` - aggregated severity series for charting
//! - `GET  /archive/{day}/{entry_id}` - archived event lookup
//! - `GET  /ws/{session_id}` - WebSocket upgrade into the delivery loop

pub mod error;
pub mod routes;
pub mod state;
pub mod ws;

pub use error::{ApiError, ErrorResponse, Result};
pub use routes::build_router;
pub use state::AppState;
