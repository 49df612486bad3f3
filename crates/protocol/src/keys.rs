//! Storage key construction
//!
//! All keys the splitter and viewers touch outside the topic logs
//! themselves are built here so the naming scheme lives in one place.

use chrono::{DateTime, Utc};

/// Sorted-set key holding per-severity counters
pub const SEVERITY_COUNTER_SET: &str = "severities";

/// Counter key used to allocate viewer session ids
pub const SESSION_ID_COUNTER: &str = "sessions:ids";

/// Audit-mirror key for the splitter-active flag
///
/// The in-process gate is authoritative; this document only records
/// operator actions for inspection.
pub const SPLITTER_FLAG_KEY: &str = "splitter:enabled";

/// Time-series key for a severity topic
pub fn ts_key(severity_topic: &str) -> String {
    format!("ts:{severity_topic}")
}

/// Archive key for a fully processed event
///
/// Partition key is the UTC calendar day (midnight epoch seconds),
/// secondary key the entry id the raw topic assigned.
pub fn archive_key(day: i64, entry_id: &str) -> String {
    format!("logs:{day}:{entry_id}")
}

/// UTC-midnight epoch seconds for the day containing `at`
pub fn day_bucket(at: DateTime<Utc>) -> i64 {
    at.date_naive()
        .and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .timestamp()
}

#[cfg(test)]
#[path = "keys_test.rs"]
mod tests;
