//! The stream splitter task
//!
//! # Protocol
//!
//! While the gate is disabled the task sleeps on a fixed idle interval
//! and touches the backend not at all. While enabled it issues bounded
//! blocking grouped reads (batch ~100, block ~1s) against the raw
//! topic with a dedicated consumer identity and processes entries
//! strictly in order:
//!
//! 1. append to the lower-cased severity topic (approximate retention cap)
//! 2. increment the severity counter, capturing the new value
//! 3. record the counter value as a time-series sample (last-wins)
//! 4. archive the full event under a day-bucketed key
//! 5. acknowledge the source entry
//!
//! The ack only happens after the archive succeeded; anything read but
//! not acked is redelivered through the backlog cursor after a restart.
//! A malformed entry (no severity) is archived when possible, logged,
//! and acked so a poison entry never wedges the batch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use sift_protocol::{archive_key, day_bucket, ts_key, Event, EVENT_FIELD, SEVERITY_COUNTER_SET};
use sift_store::{Cursor, Entry, LogStore, StoreError};

use crate::gate::SplitterGate;
use crate::metrics::SplitterMetrics;

/// Runtime configuration for the splitter
#[derive(Debug, Clone)]
pub struct SplitterConfig {
    /// Raw ingestion topic to drain
    pub raw_topic: String,
    /// Consumer group dedicated to the splitter
    pub group: String,
    /// Entries per grouped read
    pub batch_size: usize,
    /// Bounded block per read
    pub block: Duration,
    /// Idle interval while the gate is disabled
    pub idle_interval: Duration,
    /// Approximate retention cap on severity topics
    pub maxlen: u64,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            raw_topic: "ingest".to_string(),
            group: "splitter".to_string(),
            batch_size: 100,
            block: Duration::from_secs(1),
            idle_interval: Duration::from_millis(500),
            maxlen: 2_000_000,
        }
    }
}

impl SplitterConfig {
    /// Consumer identity used on the raw topic
    pub fn consumer(&self) -> String {
        format!("{}-reader", self.group)
    }
}

/// Background task splitting the raw topic by severity
pub struct StreamSplitter {
    store: Arc<dyn LogStore>,
    gate: SplitterGate,
    config: SplitterConfig,
    metrics: Arc<SplitterMetrics>,
}

impl StreamSplitter {
    pub fn new(store: Arc<dyn LogStore>, gate: SplitterGate, config: SplitterConfig) -> Self {
        Self {
            store,
            gate,
            config,
            metrics: Arc::new(SplitterMetrics::new()),
        }
    }

    /// Metrics handle, valid after `run()` consumes the splitter
    pub fn metrics(&self) -> Arc<SplitterMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run until the owning task is dropped
    ///
    /// Shutdown is cooperative: the process disables the gate first, so
    /// the loop settles into its idle interval before the task is
    /// dropped; every read in flight has a bounded timeout.
    pub async fn run(self) {
        info!(
            raw_topic = %self.config.raw_topic,
            group = %self.config.group,
            batch_size = self.config.batch_size,
            "stream splitter starting"
        );

        let consumer = self.config.consumer();
        let mut group_ready = false;
        // Start on the backlog cursor so entries read but never acked
        // by a previous incarnation are reclaimed first.
        let mut cursor = Cursor::Backlog;

        loop {
            if !self.gate.is_enabled() {
                tokio::time::sleep(self.config.idle_interval).await;
                continue;
            }

            if !group_ready {
                match self
                    .store
                    .create_group(&self.config.raw_topic, &self.config.group, true)
                    .await
                {
                    Ok(()) => group_ready = true,
                    Err(err) => {
                        warn!(error = %err, "failed to create splitter group; retrying");
                        self.metrics.record_store_error();
                        tokio::time::sleep(self.config.idle_interval).await;
                        continue;
                    }
                }
            }

            match self.drain_cycle(&consumer, cursor).await {
                Ok(processed) => {
                    if processed == 0 && cursor == Cursor::Backlog {
                        debug!("backlog drained, switching to new entries");
                        cursor = Cursor::New;
                    }
                }
                Err(err) if err.is_transient() => {
                    warn!(error = %err, "transient store error, will retry");
                    self.metrics.record_store_error();
                    tokio::time::sleep(self.config.idle_interval).await;
                }
                Err(err) => {
                    warn!(error = %err, "store rejected splitter cycle");
                    self.metrics.record_store_error();
                    tokio::time::sleep(self.config.idle_interval).await;
                }
            }
        }
    }

    /// One bounded read plus in-order processing; returns entries handled
    async fn drain_cycle(&self, consumer: &str, cursor: Cursor) -> Result<usize, StoreError> {
        let topics = [(self.config.raw_topic.clone(), cursor)];
        let batches = self
            .store
            .read_group(
                &self.config.group,
                consumer,
                &topics,
                self.config.batch_size,
                self.config.block,
            )
            .await?;

        if batches.is_empty() {
            return Ok(0);
        }

        self.metrics.record_batch();
        let mut processed = 0;
        for batch in batches {
            for entry in batch.entries {
                self.split_entry(&entry).await?;
                self.store
                    .ack(&batch.topic, &self.config.group, &entry.id)
                    .await?;
                processed += 1;
            }
        }
        Ok(processed)
    }

    /// Classify and republish one entry (steps 1-4; the caller acks)
    ///
    /// Returns `Err` only for store failures, which leave the entry
    /// unacknowledged and safely redeliverable. Classification failures
    /// are consumed here so the batch keeps moving.
    async fn split_entry(&self, entry: &Entry) -> Result<(), StoreError> {
        let decoded = entry
            .fields
            .get(EVENT_FIELD)
            .ok_or(sift_protocol::DecodeError::MissingPayload(EVENT_FIELD))
            .and_then(|payload| {
                let event = Event::from_json(payload)?;
                let topic = event.severity_topic()?;
                Ok((event, topic))
            });

        match decoded {
            Ok((event, topic)) => self.route_event(entry, &event, &topic).await,
            Err(err) => {
                warn!(
                    entry_id = %entry.id,
                    error = %err,
                    "dropping unclassifiable entry"
                );
                self.metrics.record_malformed();
                self.archive_best_effort(entry).await;
                Ok(())
            }
        }
    }

    /// Steps 1-4 for a classified event, in order
    async fn route_event(
        &self,
        entry: &Entry,
        event: &Event,
        topic: &str,
    ) -> Result<(), StoreError> {
        self.store
            .append(topic, entry.fields.clone(), Some(self.config.maxlen))
            .await?;

        let count = self
            .store
            .counter_incr(SEVERITY_COUNTER_SET, topic, 1)
            .await?;

        let labels = [
            ("log_level".to_string(), topic.to_string()),
            ("type".to_string(), "logs".to_string()),
        ];
        self.store
            .timeseries_add(
                &ts_key(topic),
                Utc::now().timestamp_millis(),
                count as f64,
                &labels,
            )
            .await?;

        let key = archive_key(day_bucket(Utc::now()), entry.id.as_str());
        self.store
            .doc_set(&key, &serde_json::to_value(event)?)
            .await?;

        self.metrics.record_split();
        debug!(entry_id = %entry.id, topic, count, "entry split");
        Ok(())
    }

    /// Archive whatever can be recovered from a malformed entry
    async fn archive_best_effort(&self, entry: &Entry) {
        let value = match entry.fields.get(EVENT_FIELD) {
            Some(payload) => serde_json::from_str(payload)
                .unwrap_or_else(|_| serde_json::json!({ "raw": payload })),
            None => serde_json::json!({ "fields": entry.fields }),
        };

        let key = archive_key(day_bucket(Utc::now()), entry.id.as_str());
        if let Err(err) = self.store.doc_set(&key, &value).await {
            warn!(entry_id = %entry.id, error = %err, "failed to archive malformed entry");
        }
    }
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
