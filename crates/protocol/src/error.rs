//! Decode error types

use thiserror::Error;

/// Errors raised while decoding a stream entry back into an event
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The entry has no event payload field at all
    #[error("entry has no '{0}' field")]
    MissingPayload(&'static str),

    /// The payload field is not valid JSON
    #[error("invalid event JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The event decoded but carries no severity
    #[error("event is missing a severity")]
    MissingSeverity,
}

/// Result type for decode operations
pub type Result<T> = std::result::Result<T, DecodeError>;
