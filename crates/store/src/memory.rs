//! In-memory log store
//!
//! Mirrors the observable semantics of the Redis backend: per-topic
//! append order, consumer-group cursors with per-consumer pending
//! bookkeeping, last-value-wins time series, and cursor-paginated set
//! scans. Blocking grouped reads wait on a [`Notify`] with a deadline,
//! so the bounded-wait contract holds here too.
//!
//! All state sits behind one mutex; the lock is never held across an
//! await point.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::{Result, StoreError};
use crate::types::{
    Aggregation, Cursor, Entry, EntryId, Fields, RangeQuery, SamplePoint, SeriesData, TopicBatch,
};
use crate::LogStore;

/// Members returned per scan page
const SCAN_PAGE: usize = 8;

#[derive(Debug)]
struct StoredEntry {
    id: EntryId,
    seq: u64,
    fields: Fields,
}

#[derive(Debug, Default)]
struct GroupState {
    /// Next sequence number the group has not yet delivered
    delivered: u64,
    /// Unacknowledged entries, keyed by entry id
    pending: HashMap<String, PendingEntry>,
}

#[derive(Debug)]
struct PendingEntry {
    consumer: String,
    seq: u64,
}

#[derive(Debug, Default)]
struct TopicState {
    entries: Vec<StoredEntry>,
    next_seq: u64,
    groups: HashMap<String, GroupState>,
}

#[derive(Debug, Default)]
struct SeriesState {
    labels: Vec<(String, String)>,
    /// timestamp -> value; inserting on an existing timestamp replaces
    /// the sample (last-value-wins)
    samples: BTreeMap<i64, f64>,
}

#[derive(Debug, Default)]
struct Inner {
    topics: HashMap<String, TopicState>,
    counters: HashMap<String, BTreeMap<String, i64>>,
    series: HashMap<String, SeriesState>,
    docs: HashMap<String, serde_json::Value>,
}

/// In-process [`LogStore`] backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    appended: Notify,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently retained in a topic
    pub fn topic_len(&self, topic: &str) -> usize {
        self.inner
            .lock()
            .topics
            .get(topic)
            .map(|t| t.entries.len())
            .unwrap_or(0)
    }

    /// Number of consumer groups on a topic
    pub fn group_count(&self, topic: &str) -> usize {
        self.inner
            .lock()
            .topics
            .get(topic)
            .map(|t| t.groups.len())
            .unwrap_or(0)
    }

    /// Current value of a counter-set member
    pub fn counter_value(&self, set: &str, member: &str) -> i64 {
        self.inner
            .lock()
            .counters
            .get(set)
            .and_then(|s| s.get(member).copied())
            .unwrap_or(0)
    }

    /// Collect whatever the cursors allow right now, without waiting
    fn collect(
        &self,
        group: &str,
        consumer: &str,
        topics: &[(String, Cursor)],
        count: usize,
    ) -> Result<Vec<TopicBatch>> {
        let mut inner = self.inner.lock();
        let mut batches = Vec::new();

        for (topic, cursor) in topics {
            let state = inner
                .topics
                .get_mut(topic)
                .ok_or_else(|| StoreError::protocol(format!("no such topic '{topic}'")))?;
            let group_state = state
                .groups
                .get_mut(group)
                .ok_or_else(|| {
                    StoreError::protocol(format!("no group '{group}' on topic '{topic}'"))
                })?;

            let mut entries = Vec::new();
            match cursor {
                Cursor::Backlog => {
                    // Redeliver this consumer's own pending entries in
                    // append order.
                    let mut pending: Vec<u64> = group_state
                        .pending
                        .values()
                        .filter(|p| p.consumer == *consumer)
                        .map(|p| p.seq)
                        .collect();
                    pending.sort_unstable();
                    pending.truncate(count);

                    for seq in pending {
                        if let Some(stored) = state.entries.iter().find(|e| e.seq == seq) {
                            entries.push(Entry {
                                id: stored.id.clone(),
                                fields: stored.fields.clone(),
                            });
                        }
                    }
                }
                Cursor::New => {
                    let start = group_state.delivered;
                    let picked: Vec<(EntryId, u64, Fields)> = state
                        .entries
                        .iter()
                        .filter(|e| e.seq >= start)
                        .take(count)
                        .map(|e| (e.id.clone(), e.seq, e.fields.clone()))
                        .collect();

                    for (id, seq, fields) in picked {
                        group_state.pending.insert(
                            id.as_str().to_string(),
                            PendingEntry {
                                consumer: consumer.to_string(),
                                seq,
                            },
                        );
                        group_state.delivered = seq + 1;
                        entries.push(Entry { id, fields });
                    }
                }
            }

            if !entries.is_empty() {
                batches.push(TopicBatch {
                    topic: topic.clone(),
                    entries,
                });
            }
        }

        Ok(batches)
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn append(&self, topic: &str, fields: Fields, maxlen: Option<u64>) -> Result<EntryId> {
        let id = {
            let mut inner = self.inner.lock();
            let state = inner.topics.entry(topic.to_string()).or_default();
            let seq = state.next_seq;
            state.next_seq += 1;

            let id = EntryId::new(format!("{seq}-0"));
            state.entries.push(StoredEntry {
                id: id.clone(),
                seq,
                fields,
            });

            if let Some(maxlen) = maxlen {
                let maxlen = maxlen as usize;
                if state.entries.len() > maxlen {
                    let excess = state.entries.len() - maxlen;
                    state.entries.drain(..excess);
                }
            }

            id
        };

        self.appended.notify_waiters();
        Ok(id)
    }

    async fn read_group(
        &self,
        group: &str,
        consumer: &str,
        topics: &[(String, Cursor)],
        count: usize,
        block: Duration,
    ) -> Result<Vec<TopicBatch>> {
        if topics.is_empty() {
            return Err(StoreError::EmptySubscription);
        }

        let deadline = tokio::time::Instant::now() + block;
        loop {
            // Register for wakeups before collecting so an append
            // between the two is not missed.
            let notified = self.appended.notified();

            let batches = self.collect(group, consumer, topics, count)?;
            if !batches.is_empty() || block.is_zero() {
                return Ok(batches);
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(Vec::new());
            }
        }
    }

    async fn ack(&self, topic: &str, group: &str, id: &EntryId) -> Result<()> {
        let mut inner = self.inner.lock();
        if let Some(state) = inner.topics.get_mut(topic) {
            if let Some(group_state) = state.groups.get_mut(group) {
                group_state.pending.remove(id.as_str());
            }
        }
        // Acking an unknown entry is a no-op, as in the backend.
        Ok(())
    }

    async fn create_group(&self, topic: &str, group: &str, create_topic: bool) -> Result<()> {
        let mut inner = self.inner.lock();

        let state = if create_topic {
            inner.topics.entry(topic.to_string()).or_default()
        } else {
            inner
                .topics
                .get_mut(topic)
                .ok_or_else(|| StoreError::protocol(format!("no such topic '{topic}'")))?
        };

        if state.groups.contains_key(group) {
            // Duplicate creation is success by contract.
            tracing::debug!(topic, group, "consumer group already exists");
            return Ok(());
        }

        // New groups start at the current end of the topic.
        let delivered = state.next_seq;
        state.groups.insert(
            group.to_string(),
            GroupState {
                delivered,
                pending: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn counter_incr(&self, set: &str, member: &str, delta: i64) -> Result<i64> {
        let mut inner = self.inner.lock();
        let counter = inner
            .counters
            .entry(set.to_string())
            .or_default()
            .entry(member.to_string())
            .or_insert(0);
        *counter += delta;
        Ok(*counter)
    }

    async fn timeseries_add(
        &self,
        key: &str,
        timestamp_ms: i64,
        value: f64,
        labels: &[(String, String)],
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        let series = inner.series.entry(key.to_string()).or_default();
        if series.labels.is_empty() {
            series.labels = labels.to_vec();
        }
        series.samples.insert(timestamp_ms, value);
        Ok(())
    }

    async fn timeseries_range(&self, query: &RangeQuery) -> Result<Vec<SeriesData>> {
        let inner = self.inner.lock();
        let filters = query.parsed_filters();
        let bucket = query.bucket_ms.max(1) as i64;
        let mut result = Vec::new();

        for (key, series) in &inner.series {
            let matches = filters.iter().all(|(name, value)| {
                series
                    .labels
                    .iter()
                    .any(|(label, v)| label == name && v == value)
            });
            if !matches {
                continue;
            }

            let mut buckets: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
            for (&ts, &value) in &series.samples {
                if query.from.is_some_and(|from| ts < from) {
                    continue;
                }
                if query.to.is_some_and(|to| ts > to) {
                    continue;
                }
                buckets.entry(ts - ts.rem_euclid(bucket)).or_default().push(value);
            }

            let data = buckets
                .into_iter()
                .map(|(x, values)| {
                    let y = match query.aggregation {
                        Aggregation::Count => values.len() as f64,
                        Aggregation::Avg => values.iter().sum::<f64>() / values.len() as f64,
                        Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
                        Aggregation::Max => {
                            values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
                        }
                    };
                    SamplePoint { x, y }
                })
                .collect();

            let name = series
                .labels
                .iter()
                .find(|(label, _)| label == "log_level")
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| key.clone());

            result.push(SeriesData { name, data });
        }

        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn doc_set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.inner.lock().docs.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn doc_get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.inner.lock().docs.get(key).cloned())
    }

    async fn scan_set(&self, set: &str, cursor: u64) -> Result<(u64, Vec<String>)> {
        let inner = self.inner.lock();
        let members: Vec<&String> = match inner.counters.get(set) {
            Some(counter) => counter.keys().collect(),
            None => return Ok((0, Vec::new())),
        };

        let start = cursor as usize;
        let page: Vec<String> = members
            .iter()
            .skip(start)
            .take(SCAN_PAGE)
            .map(|m| m.to_string())
            .collect();

        let next = start + page.len();
        let next_cursor = if next >= members.len() { 0 } else { next as u64 };
        Ok((next_cursor, page))
    }

    async fn health(&self) -> Result<serde_json::Value> {
        let inner = self.inner.lock();
        Ok(serde_json::json!({
            "backend": "memory",
            "topics": inner.topics.len(),
            "series": inner.series.len(),
            "documents": inner.docs.len(),
        }))
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
