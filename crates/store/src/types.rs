//! Core store types
//!
//! Entry identity, read cursors, and the time-series query shapes
//! shared by both backends.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier the store assigned to an appended entry
///
/// Monotonic within its topic; opaque to callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Field map of a stream entry
pub type Fields = HashMap<String, String>;

/// One entry returned from a grouped read
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub fields: Fields,
}

/// Entries returned for a single topic in one grouped read
#[derive(Debug, Clone, PartialEq)]
pub struct TopicBatch {
    pub topic: String,
    pub entries: Vec<Entry>,
}

/// Delivery marker for a grouped read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Only entries never delivered to the group (`>`)
    New,
    /// This consumer's own pending, unacknowledged entries (`0`)
    Backlog,
}

impl Cursor {
    /// Stream-id form of the cursor
    #[inline]
    pub fn as_stream_id(&self) -> &'static str {
        match self {
            Self::New => ">",
            Self::Backlog => "0",
        }
    }
}

/// Aggregation applied per bucket in a time-series range query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Count,
    Avg,
    Min,
    Max,
}

impl Aggregation {
    /// Backend aggregator name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

/// Multi-series range query over the time-series store
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RangeQuery {
    /// Start of the range, epoch milliseconds; None means the series start
    pub from: Option<i64>,
    /// End of the range, epoch milliseconds; None means the series end
    pub to: Option<i64>,
    /// Per-bucket aggregation
    pub aggregation: Aggregation,
    /// Bucket width in milliseconds
    pub bucket_ms: u64,
    /// Label filters in `label=value` form; all must match
    pub filters: Vec<String>,
}

impl Default for RangeQuery {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            aggregation: Aggregation::Count,
            bucket_ms: 1000,
            filters: vec!["type=logs".to_string()],
        }
    }
}

impl RangeQuery {
    /// Parse the `label=value` filters, skipping malformed ones
    pub fn parsed_filters(&self) -> Vec<(&str, &str)> {
        self.filters
            .iter()
            .filter_map(|f| f.split_once('='))
            .collect()
    }
}

/// One series of a range query result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    /// Series display name (the `log_level` label when present)
    pub name: String,
    /// Aggregated samples in time order
    pub data: Vec<SamplePoint>,
}

/// One aggregated sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePoint {
    /// Bucket timestamp, epoch milliseconds
    pub x: i64,
    /// Aggregated value
    pub y: f64,
}
