//! Wire frames pushed to viewers
//!
//! One JSON object per frame, tagged by `type`:
//!
//! ```json
//! {"type": "ping",    "data": {"timestamp": 1714557600123, "status": {...}}}
//! {"type": "message", "data": {"timestamp": "...", "hostname": "...", ...}}
//! ```
//!
//! `ping` opens a heartbeat round-trip and carries the backend health
//! snapshot current at send time. `message` carries one fully decoded
//! event; a frame is never constructed from a partially decoded entry.

use serde::{Deserialize, Serialize};

/// A frame on the viewer wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Frame {
    /// Heartbeat ping; the client answers with any text frame
    Ping(PingData),
    /// One delivered event, fully decoded
    Message(serde_json::Value),
}

/// Payload of a ping frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingData {
    /// Milliseconds since the Unix epoch at send time
    pub timestamp: i64,
    /// Backend health snapshot
    pub status: serde_json::Value,
}

impl Frame {
    /// Build a ping frame
    pub fn ping(timestamp: i64, status: serde_json::Value) -> Self {
        Self::Ping(PingData { timestamp, status })
    }

    /// Build a message frame from a decoded event object
    pub fn message(event: serde_json::Value) -> Self {
        Self::Message(event)
    }

    /// Serialize to the wire representation
    pub fn to_json(&self) -> String {
        // Frames are built from values that already serialized once.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
