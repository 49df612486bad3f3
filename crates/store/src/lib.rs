//! Sift Store - the durable log store collaborator
//!
//! Everything sift persists goes through the [`LogStore`] trait:
//! append-only topic logs with consumer-group read/ack semantics, a
//! counter store, a time-series store, a document store, and
//! cursor-based set scanning. The splitter and every viewer session
//! talk to the same trait object.
//!
//! Two implementations ship:
//!
//! - [`RedisStore`] - streams, sorted sets, RedisTimeSeries and
//!   RedisJSON over a multiplexed connection
//! - [`MemoryStore`] - an in-process backend with the same observable
//!   semantics, used by the async test suites
//!
//! # Delivery semantics
//!
//! Within one topic and one consumer group, delivery order matches
//! append order, and an acknowledged entry is never redelivered to the
//! same consumer identity. Unacknowledged entries remain pending and
//! are redeliverable through the [`Cursor::Backlog`] marker, which is
//! how the splitter recovers after a crash.

pub mod error;
pub mod memory;
pub mod redis;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use self::redis::RedisStore;
pub use types::{
    Aggregation, Cursor, Entry, EntryId, Fields, RangeQuery, SamplePoint, SeriesData, TopicBatch,
};

/// The durable log store contract
///
/// All reads that can wait for data are bounded: `read_group` blocks at
/// most `block` before returning whatever it has, so no caller ever
/// blocks unboundedly on the store.
#[async_trait]
pub trait LogStore: Send + Sync + 'static {
    /// Append an entry to a topic, creating the topic if absent
    ///
    /// `maxlen` is an approximate retention cap; older entries may be
    /// trimmed once the topic grows past it.
    async fn append(&self, topic: &str, fields: Fields, maxlen: Option<u64>) -> Result<EntryId>;

    /// Bounded blocking grouped read across `topics`
    ///
    /// Returns at most `count` entries per topic. Entries delivered
    /// under [`Cursor::New`] become pending for `consumer` until acked.
    /// An empty `topics` slice is [`StoreError::EmptySubscription`].
    async fn read_group(
        &self,
        group: &str,
        consumer: &str,
        topics: &[(String, Cursor)],
        count: usize,
        block: Duration,
    ) -> Result<Vec<TopicBatch>>;

    /// Acknowledge an entry to its topic's group, advancing the cursor
    async fn ack(&self, topic: &str, group: &str, id: &EntryId) -> Result<()>;

    /// Create a consumer group on a topic
    ///
    /// Idempotent: creating a group that already exists succeeds. With
    /// `create_topic` the topic is created empty when absent; without
    /// it, a missing topic is an error.
    async fn create_group(&self, topic: &str, group: &str, create_topic: bool) -> Result<()>;

    /// Atomically increment a member of a counter set; returns the new value
    async fn counter_incr(&self, set: &str, member: &str, delta: i64) -> Result<i64>;

    /// Record a time-series sample
    ///
    /// Duplicate timestamps follow a last-value-wins policy.
    async fn timeseries_add(
        &self,
        key: &str,
        timestamp_ms: i64,
        value: f64,
        labels: &[(String, String)],
    ) -> Result<()>;

    /// Aggregated multi-series range query over labeled series
    async fn timeseries_range(&self, query: &RangeQuery) -> Result<Vec<SeriesData>>;

    /// Store a JSON document under a key
    async fn doc_set(&self, key: &str, value: &serde_json::Value) -> Result<()>;

    /// Fetch a JSON document; `None` when the key is absent
    async fn doc_get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// One page of a cursor-based scan over a counter set's members
    ///
    /// Start with cursor 0; a returned cursor of 0 terminates the scan.
    async fn scan_set(&self, set: &str, cursor: u64) -> Result<(u64, Vec<String>)>;

    /// Backend health snapshot, included in heartbeat pings
    async fn health(&self) -> Result<serde_json::Value>;
}
