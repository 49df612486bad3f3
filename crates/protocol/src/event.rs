//! The log event record
//!
//! An event is immutable once appended: timestamp, origin hostname,
//! severity, message, and optional geo enrichment. Identity comes from
//! the entry id the store assigned on append, scoped to the topic the
//! event was appended to - the event itself carries no id.

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};

/// A single log event
///
/// Geo fields are enrichment that upstream producers may or may not
/// attach; they serialize only when present so the wire shape stays
/// minimal for the common case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// ISO-8601 timestamp as produced by the emitter
    pub timestamp: String,

    /// Origin host
    pub hostname: String,

    /// Severity label (e.g. "ERROR", "INFO"); casing is preserved
    /// here and normalized only for topic naming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Free-form message body
    pub message: String,

    /// Optional geo enrichment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Event {
    /// Create an event with the required fields only
    pub fn new(
        timestamp: impl Into<String>,
        hostname: impl Into<String>,
        log_level: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            hostname: hostname.into(),
            log_level: Some(log_level.into()),
            message: message.into(),
            latitude: None,
            longitude: None,
            country: None,
        }
    }

    /// The event's severity label
    ///
    /// Returns [`DecodeError::MissingSeverity`] when the field is
    /// absent or empty - the classification failure the splitter
    /// handles with its drop-and-archive policy.
    pub fn severity(&self) -> Result<&str> {
        match self.log_level.as_deref() {
            Some(level) if !level.is_empty() => Ok(level),
            _ => Err(DecodeError::MissingSeverity),
        }
    }

    /// The per-severity topic this event routes to
    pub fn severity_topic(&self) -> Result<String> {
        Ok(severity_topic(self.severity()?))
    }

    /// Parse an event from its serialized `json` field
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Serialize back to the stream payload representation
    pub fn to_json(&self) -> String {
        // Event contains only string/number fields; serialization
        // cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Topic name for a severity label
///
/// Severity topics are the lower-cased label, so `"ERROR"` and
/// `"error"` land in the same log.
pub fn severity_topic(severity: &str) -> String {
    severity.to_lowercase()
}

#[cfg(test)]
#[path = "event_test.rs"]
mod tests;
