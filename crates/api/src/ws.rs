//! WebSocket viewer endpoint
//!
//! `GET /ws/{session_id}` upgrades the connection and hands the socket
//! to the connection manager, which registers the session, drives its
//! delivery loop, and releases it when the socket closes. The adapter
//! below is the [`Transport`] realization over an axum WebSocket.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use tracing::{debug, warn};

use sift_viewer::{Transport, ViewerError};

use crate::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<u64>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id))
}

/// Run one viewer connection to completion
async fn handle_socket(socket: WebSocket, state: AppState, session_id: u64) {
    debug!(session_id, "websocket accepted");

    let transport = WsTransport { socket };
    if let Err(err) = state.manager.serve(session_id, transport).await {
        warn!(session_id, error = %err, "viewer connection ended with error");
    }
}

/// [`Transport`] over an axum WebSocket
struct WsTransport {
    socket: WebSocket,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send_text(&mut self, text: &str) -> Result<(), ViewerError> {
        self.socket
            .send(Message::Text(text.into()))
            .await
            .map_err(|_| ViewerError::TransportClosed)
    }

    async fn send_json(&mut self, value: &serde_json::Value) -> Result<(), ViewerError> {
        self.send_text(&value.to_string()).await
    }

    async fn receive_text(&mut self) -> Result<String, ViewerError> {
        loop {
            match self.socket.recv().await {
                Some(Ok(Message::Text(text))) => return Ok(text.to_string()),
                Some(Ok(Message::Close(_))) | None => return Err(ViewerError::TransportClosed),
                // Pings/pongs/binary are not part of the heartbeat
                // handshake; keep waiting for the text acknowledgment.
                Some(Ok(_)) => continue,
                Some(Err(_)) => return Err(ViewerError::TransportClosed),
            }
        }
    }
}
