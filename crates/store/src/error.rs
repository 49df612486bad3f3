//! Store error taxonomy
//!
//! The split matters to callers: transient errors are retried on the
//! next cycle with no data loss (the entry stays unacknowledged),
//! duplicate-group errors are idempotent no-ops, and an empty
//! subscription is an empty read rather than a failure.

use thiserror::Error;

/// Errors surfaced by the durable log store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or momentarily failing; safe to retry
    #[error("transient backend error: {0}")]
    Transient(String),

    /// Consumer group already exists for this topic
    #[error("group '{group}' already exists on topic '{topic}'")]
    DuplicateGroup { topic: String, group: String },

    /// A grouped read was issued with no subscribed topics
    #[error("no topics subscribed")]
    EmptySubscription,

    /// The backend rejected the request (bad command, missing group)
    #[error("store protocol error: {0}")]
    Protocol(String),

    /// Stored document failed to parse
    #[error("stored value malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether retrying the same call next cycle is reasonable
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Whether this is the idempotent duplicate-group case
    #[inline]
    pub fn is_duplicate_group(&self) -> bool {
        matches!(self, Self::DuplicateGroup { .. })
    }

    /// Whether this is the empty-subscription no-op
    #[inline]
    pub fn is_empty_subscription(&self) -> bool {
        matches!(self, Self::EmptySubscription)
    }

    /// Create a transient error
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(StoreError::transient("down").is_transient());
        assert!(!StoreError::transient("down").is_duplicate_group());

        let dup = StoreError::DuplicateGroup {
            topic: "error".into(),
            group: "viewers".into(),
        };
        assert!(dup.is_duplicate_group());
        assert!(!dup.is_transient());

        assert!(StoreError::EmptySubscription.is_empty_subscription());
    }

    #[test]
    fn test_display() {
        let dup = StoreError::DuplicateGroup {
            topic: "error".into(),
            group: "viewers".into(),
        };
        assert!(dup.to_string().contains("viewers"));
        assert!(dup.to_string().contains("error"));

        assert!(StoreError::EmptySubscription.to_string().contains("no topics"));
    }
}
