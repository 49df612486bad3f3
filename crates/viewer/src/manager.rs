//! The connection manager
//!
//! Single authority over session lifecycle and shared topic discovery.
//! The session registry is only ever mutated through the operations
//! here; delivery loops hold read handles to their own session and
//! nothing else.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info};

use sift_protocol::keys::SESSION_ID_COUNTER;
use sift_protocol::SPLITTER_FLAG_KEY;
use sift_splitter::SplitterGate;
use sift_store::LogStore;

use crate::delivery::DeliveryLoop;
use crate::error::{Result, ViewerError};
use crate::registry::SeverityRegistry;
use crate::session::{Session, SessionId};
use crate::transport::Transport;

/// Runtime configuration for the viewer side
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Raw ingestion topic, the fallback subscription before any
    /// severity is known
    pub raw_topic: String,
    /// Consumer group shared by all viewer sessions
    pub group: String,
    /// Silence threshold before a heartbeat round-trip
    pub heartbeat_interval: Duration,
    /// Sleep applied when a session's subscription set is empty
    pub empty_idle: Duration,
    /// Bounded block per grouped read
    pub block: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            raw_topic: "ingest".to_string(),
            group: "viewers".to_string(),
            heartbeat_interval: Duration::from_secs(5),
            empty_idle: Duration::from_secs(1),
            block: Duration::from_secs(1),
        }
    }
}

/// Owner of all live viewer sessions
pub struct ConnectionManager {
    store: Arc<dyn LogStore>,
    gate: SplitterGate,
    config: ViewerConfig,
    registry: SeverityRegistry,
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    available: RwLock<BTreeSet<String>>,
}

impl ConnectionManager {
    pub fn new(store: Arc<dyn LogStore>, gate: SplitterGate, config: ViewerConfig) -> Self {
        let registry = SeverityRegistry::new(Arc::clone(&store), config.group.clone());
        Self {
            store,
            gate,
            config,
            registry,
            sessions: RwLock::new(HashMap::new()),
            available: RwLock::new(BTreeSet::new()),
        }
    }

    /// Viewer runtime configuration
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Allocate a fresh session id from the counter store
    pub async fn allocate_session_id(&self) -> Result<SessionId> {
        let id = self.store.counter_incr(SESSION_ID_COUNTER, "next", 1).await?;
        Ok(id as SessionId)
    }

    /// Register a session and seed its subscription set
    ///
    /// Seeds from the current severity snapshot; when no severities
    /// are known and the splitter is inactive the raw topic is the
    /// only seed, so early viewers still see traffic.
    pub async fn connect(&self, id: SessionId) -> Result<Arc<Session>> {
        if self.sessions.read().contains_key(&id) {
            return Err(ViewerError::SessionExists { id });
        }

        let available = self.refresh_topics().await?;
        let seed: Vec<String> = if available.is_empty() && !self.gate.is_enabled() {
            vec![self.config.raw_topic.clone()]
        } else {
            available.into_iter().collect()
        };

        let session = Arc::new(Session::new(id, seed));
        session.activate();
        self.sessions.write().insert(id, Arc::clone(&session));

        info!(session_id = id, topics = session.subscription_count(), "session connected");
        Ok(session)
    }

    /// Release a session; no further delivery occurs for it
    pub fn disconnect(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().remove(&id);
        if let Some(session) = removed {
            session.disconnect();
            info!(session_id = id, "session disconnected");
            true
        } else {
            false
        }
    }

    /// Run one viewer connection end to end
    ///
    /// Registers the session, drives its delivery loop until the
    /// transport closes, then releases it.
    pub async fn serve<T: Transport>(&self, id: SessionId, transport: T) -> Result<()> {
        let session = self.connect(id).await?;
        DeliveryLoop::new(
            Arc::clone(&self.store),
            session,
            self.config.clone(),
            transport,
        )
        .run()
        .await;
        self.disconnect(id);
        Ok(())
    }

    /// Re-derive the known severities and update the shared snapshot
    pub async fn refresh_topics(&self) -> Result<BTreeSet<String>> {
        let severities = self.registry.refresh().await?;
        *self.available.write() = severities.clone();
        Ok(severities)
    }

    /// Last discovered severity snapshot
    pub fn available_topics(&self) -> BTreeSet<String> {
        self.available.read().clone()
    }

    /// Whether the splitter gate is currently enabled
    pub fn splitter_active(&self) -> bool {
        self.gate.is_enabled()
    }

    /// Enable the splitter and drop the raw topic from every session
    ///
    /// Once splitting is active the raw topic and the severity topics
    /// would deliver the same events twice; removal is idempotent, so
    /// repeated activation is harmless.
    pub async fn activate_splitter(&self) -> Result<()> {
        self.gate.enable();

        self.strip_raw_topic();

        // Audit mirror only; the gate is the in-process authority.
        self.store
            .doc_set(SPLITTER_FLAG_KEY, &serde_json::Value::Bool(true))
            .await?;
        info!("splitter activated");
        Ok(())
    }

    /// Strip the raw ingestion topic from every live session.
    ///
    /// Kept synchronous so the session read guard (which is not `Send`)
    /// is fully released before the caller's `await` points.
    fn strip_raw_topic(&self) {
        let sessions = self.sessions.read();
        for session in sessions.values() {
            if session.unsubscribe(&self.config.raw_topic) {
                debug!(
                    session_id = session.id(),
                    topic = %self.config.raw_topic,
                    "raw topic removed on splitter activation"
                );
            }
        }
    }

    /// Disable the splitter
    pub async fn deactivate_splitter(&self) -> Result<()> {
        self.gate.disable();
        self.store
            .doc_set(SPLITTER_FLAG_KEY, &serde_json::Value::Bool(false))
            .await?;
        info!("splitter deactivated");
        Ok(())
    }

    /// Add a topic to one session's subscription set
    ///
    /// Any topic name is permitted, not only discovered severities.
    pub fn add_subscription(&self, id: SessionId, topic: &str) -> Result<()> {
        let session = self.session(id).ok_or(ViewerError::SessionNotFound { id })?;
        session.subscribe(topic);
        debug!(session_id = id, topic, "subscription added");
        Ok(())
    }

    /// Remove a topic from one session's subscription set
    pub fn remove_subscription(&self, id: SessionId, topic: &str) -> Result<()> {
        let session = self.session(id).ok_or(ViewerError::SessionNotFound { id })?;
        session.unsubscribe(topic);
        debug!(session_id = id, topic, "subscription removed");
        Ok(())
    }

    /// Look up a live session
    pub fn session(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.read().get(&id).cloned()
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
