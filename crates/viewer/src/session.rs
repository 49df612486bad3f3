//! Viewer session state
//!
//! A session is one connected viewer's delivery context: its
//! subscription set, heartbeat bookkeeping, and lifecycle state. The
//! struct itself is shared (the manager holds it in the registry, the
//! delivery loop holds a second handle) but every mutation path goes
//! through the [`ConnectionManager`].
//!
//! [`ConnectionManager`]: crate::ConnectionManager

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;

use sift_store::Cursor;

/// Identifier allocated for one viewer connection
pub type SessionId = u64;

/// Session lifecycle
///
/// `Disconnected` is terminal; there is no re-entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport accepted, subscriptions not yet seeded
    Connecting,
    /// Delivery loop eligible to run
    Active,
    /// Transport gone; the manager has released or will release the session
    Disconnected,
}

/// One connected viewer
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    state: Mutex<SessionState>,
    subscriptions: Mutex<HashMap<String, Cursor>>,
    last_heartbeat: Mutex<Instant>,
}

impl Session {
    /// Create a session in the `Connecting` state with seeded topics
    pub(crate) fn new(id: SessionId, topics: impl IntoIterator<Item = String>) -> Self {
        Self {
            id,
            state: Mutex::new(SessionState::Connecting),
            subscriptions: Mutex::new(
                topics.into_iter().map(|t| (t, Cursor::New)).collect(),
            ),
            last_heartbeat: Mutex::new(Instant::now()),
        }
    }

    #[inline]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Mark the session active; only valid from `Connecting`
    pub(crate) fn activate(&self) {
        let mut state = self.state.lock();
        if *state == SessionState::Connecting {
            *state = SessionState::Active;
        }
    }

    /// Terminal transition; idempotent
    pub(crate) fn disconnect(&self) {
        *self.state.lock() = SessionState::Disconnected;
    }

    /// Snapshot of the subscription set for one read cycle
    pub fn subscriptions(&self) -> Vec<(String, Cursor)> {
        self.subscriptions
            .lock()
            .iter()
            .map(|(topic, cursor)| (topic.clone(), *cursor))
            .collect()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.subscriptions.lock().contains_key(topic)
    }

    /// Add a topic; returns false if it was already present
    pub(crate) fn subscribe(&self, topic: &str) -> bool {
        self.subscriptions
            .lock()
            .insert(topic.to_string(), Cursor::New)
            .is_none()
    }

    /// Remove a topic; returns false if it was not present
    pub(crate) fn unsubscribe(&self, topic: &str) -> bool {
        self.subscriptions.lock().remove(topic).is_some()
    }

    /// Record a completed heartbeat round-trip
    pub fn touch_heartbeat(&self) {
        *self.last_heartbeat.lock() = Instant::now();
    }

    /// Time since the last acknowledged heartbeat
    pub fn heartbeat_elapsed(&self) -> std::time::Duration {
        self.last_heartbeat.lock().elapsed()
    }
}
