//! The per-session transport seam
//!
//! A [`Transport`] is whatever carries frames to one viewer: the
//! WebSocket adapter in the HTTP surface, or an in-process channel
//! pair. `receive_text` exists only for the heartbeat handshake - the
//! delivery loop never reads anything else from the client.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{Result, ViewerError};

/// One viewer's frame carrier
///
/// All methods surface closure as [`ViewerError::TransportClosed`],
/// which is terminal for the owning session.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send a raw text frame
    async fn send_text(&mut self, text: &str) -> Result<()>;

    /// Send a value as one JSON text frame
    async fn send_json(&mut self, value: &serde_json::Value) -> Result<()>;

    /// Wait for the next text frame from the client
    async fn receive_text(&mut self) -> Result<String>;
}

/// In-process transport over unbounded channels
///
/// The counterpart [`TransportPeer`] plays the client: it reads frames
/// the loop pushed and writes heartbeat acknowledgments. Dropping the
/// peer closes the transport.
#[derive(Debug)]
pub struct ChannelTransport {
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<String>,
}

/// The client end of a [`ChannelTransport`]
#[derive(Debug)]
pub struct TransportPeer {
    frames: mpsc::UnboundedReceiver<String>,
    replies: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    /// Create a connected transport/peer pair
    pub fn pair() -> (Self, TransportPeer) {
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        (
            Self {
                outbound: frame_tx,
                inbound: reply_rx,
            },
            TransportPeer {
                frames: frame_rx,
                replies: reply_tx,
            },
        )
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send_text(&mut self, text: &str) -> Result<()> {
        self.outbound
            .send(text.to_string())
            .map_err(|_| ViewerError::TransportClosed)
    }

    async fn send_json(&mut self, value: &serde_json::Value) -> Result<()> {
        self.send_text(&value.to_string()).await
    }

    async fn receive_text(&mut self) -> Result<String> {
        self.inbound.recv().await.ok_or(ViewerError::TransportClosed)
    }
}

impl TransportPeer {
    /// Next frame pushed by the delivery loop; `None` once closed
    pub async fn recv(&mut self) -> Option<String> {
        self.frames.recv().await
    }

    /// Next frame parsed as JSON
    pub async fn recv_json(&mut self) -> Option<serde_json::Value> {
        let frame = self.recv().await?;
        serde_json::from_str(&frame).ok()
    }

    /// Non-blocking read of a pushed frame
    pub fn try_recv(&mut self) -> Option<String> {
        self.frames.try_recv().ok()
    }

    /// Answer a heartbeat ping
    pub fn reply(&self, text: &str) {
        let _ = self.replies.send(text.to_string());
    }
}
