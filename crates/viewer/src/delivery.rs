//! The per-session delivery loop
//!
//! Each active session runs one loop iteration after another:
//!
//! 1. **Heartbeat** - after 5s of silence, push a ping frame carrying
//!    a timestamp and the backend health snapshot, then block for
//!    exactly one reciprocal text frame. A client that never answers
//!    stalls only its own loop.
//! 2. **Idle** - with an empty subscription set, sleep 1s and retry;
//!    no backend call is made.
//! 3. **Read** - one bounded grouped read (1 entry per subscribed
//!    topic, ~1s block) under the consumer identity derived from the
//!    session id. Every returned entry is acknowledged immediately,
//!    then decoded, then forwarded as a `message` frame.
//!
//! Acknowledging before the frame is flushed makes delivery to viewers
//! at-most-once by design: a connection dropped between ack and push
//! loses that one frame. Reordering the ack after a confirmed flush
//! would trade that for duplicate frames; this codebase deliberately
//! keeps the original behavior.
//!
//! Failure isolation: a decode error skips one entry, a store error
//! aborts one read cycle, and only a closed transport ends the loop.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use sift_protocol::{Event, Frame, EVENT_FIELD};
use sift_store::{Entry, LogStore};

use crate::error::ViewerError;
use crate::manager::ViewerConfig;
use crate::session::Session;
use crate::transport::Transport;

/// Delivery loop for one viewer session
pub struct DeliveryLoop<T: Transport> {
    store: Arc<dyn LogStore>,
    session: Arc<Session>,
    config: ViewerConfig,
    transport: T,
    consumer: String,
}

impl<T: Transport> DeliveryLoop<T> {
    pub fn new(
        store: Arc<dyn LogStore>,
        session: Arc<Session>,
        config: ViewerConfig,
        transport: T,
    ) -> Self {
        let consumer = format!("viewer-{}", session.id());
        Self {
            store,
            session,
            config,
            transport,
            consumer,
        }
    }

    /// Drive the session until its transport closes
    pub async fn run(mut self) {
        debug!(session_id = self.session.id(), "delivery loop starting");

        loop {
            match self.cycle().await {
                Ok(()) => {}
                Err(err) if err.is_closed() => {
                    info!(session_id = self.session.id(), "transport closed");
                    break;
                }
                Err(err) => {
                    // Transient store trouble aborts only this cycle.
                    warn!(
                        session_id = self.session.id(),
                        error = %err,
                        "read cycle failed"
                    );
                    tokio::time::sleep(self.config.empty_idle).await;
                }
            }
        }

        self.session.disconnect();
    }

    /// One loop iteration
    async fn cycle(&mut self) -> Result<(), ViewerError> {
        if self.session.heartbeat_elapsed() >= self.config.heartbeat_interval {
            self.heartbeat_roundtrip().await?;
        }

        let topics = self.session.subscriptions();
        if topics.is_empty() {
            tokio::time::sleep(self.config.empty_idle).await;
            return Ok(());
        }

        let batches = match self
            .store
            .read_group(&self.config.group, &self.consumer, &topics, 1, self.config.block)
            .await
        {
            Ok(batches) => batches,
            // The set emptied between snapshot and read: an empty
            // result, never a failure.
            Err(err) if err.is_empty_subscription() => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        for batch in batches {
            for entry in batch.entries {
                // Ack first: at-most-once to this viewer (see module docs).
                self.store
                    .ack(&batch.topic, &self.config.group, &entry.id)
                    .await?;
                self.forward(&batch.topic, entry).await?;
            }
        }

        Ok(())
    }

    /// Push one frame as JSON
    async fn send_frame(&mut self, frame: &Frame) -> Result<(), ViewerError> {
        match serde_json::to_value(frame) {
            Ok(value) => self.transport.send_json(&value).await,
            Err(err) => {
                warn!(session_id = self.session.id(), error = %err, "frame did not serialize");
                Ok(())
            }
        }
    }

    /// Ping, then block for exactly one acknowledgment
    async fn heartbeat_roundtrip(&mut self) -> Result<(), ViewerError> {
        let status = match self.store.health().await {
            Ok(status) => status,
            Err(err) => serde_json::json!({ "error": err.to_string() }),
        };

        let frame = Frame::ping(Utc::now().timestamp_millis(), status);
        self.send_frame(&frame).await?;
        self.transport.receive_text().await?;
        self.session.touch_heartbeat();
        Ok(())
    }

    /// Decode an entry and push it as a message frame
    ///
    /// The entry is already acknowledged; one that fails to decode is
    /// skipped with a warning, and no partial frame is ever emitted.
    async fn forward(&mut self, topic: &str, entry: Entry) -> Result<(), ViewerError> {
        let decoded = entry
            .fields
            .get(EVENT_FIELD)
            .ok_or(sift_protocol::DecodeError::MissingPayload(EVENT_FIELD))
            .and_then(|payload| {
                // Validate the full event shape before anything is sent.
                Event::from_json(payload)?;
                Ok(serde_json::from_str::<serde_json::Value>(payload)?)
            });

        match decoded {
            Ok(data) => {
                self.send_frame(&Frame::message(data)).await?;
                debug!(
                    session_id = self.session.id(),
                    topic,
                    entry_id = %entry.id,
                    "frame delivered"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    session_id = self.session.id(),
                    topic,
                    entry_id = %entry.id,
                    error = %err,
                    "skipping undecodable entry"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "delivery_test.rs"]
mod tests;
