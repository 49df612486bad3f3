//! Redis-backed log store
//!
//! Topics are Redis streams, counters a sorted set, time series
//! RedisTimeSeries keys, and archived documents RedisJSON values. All
//! traffic goes over one multiplexed [`ConnectionManager`], which
//! reconnects on its own; command failures surface through the store
//! error taxonomy so callers can tell transient from fatal.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::streams::{StreamMaxlen, StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, Value};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::types::{
    Cursor, Entry, EntryId, Fields, RangeQuery, SamplePoint, SeriesData, TopicBatch,
};
use crate::LogStore;

/// Redis [`LogStore`] backend
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to the given Redis URL
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_err)?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(map_redis_err)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl LogStore for RedisStore {
    async fn append(&self, topic: &str, fields: Fields, maxlen: Option<u64>) -> Result<EntryId> {
        let mut conn = self.conn.clone();
        let items: Vec<(String, String)> = fields.into_iter().collect();

        let id: String = match maxlen {
            Some(maxlen) => {
                conn.xadd_maxlen(topic, StreamMaxlen::Approx(maxlen as usize), "*", &items)
                    .await
                    .map_err(map_redis_err)?
            }
            None => conn.xadd(topic, "*", &items).await.map_err(map_redis_err)?,
        };

        Ok(EntryId::new(id))
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

        let keys: Vec<&str> = topics.iter().map(|(topic, _)| topic.as_str()).collect();
        let ids: Vec<&str> = topics.iter().map(|(_, cursor)| cursor.as_stream_id()).collect();

        let mut opts = StreamReadOptions::default()
            .group(group, consumer)
            .count(count);
        if !block.is_zero() {
            opts = opts.block(block.as_millis() as usize);
        }

        let mut conn = self.conn.clone();
        let reply: StreamReadReply = conn
            .xread_options(&keys, &ids, &opts)
            .await
            .map_err(map_redis_err)?;

        let batches = reply
            .keys
            .into_iter()
            .map(|key| TopicBatch {
                topic: key.key,
                entries: key
                    .ids
                    .into_iter()
                    .map(|entry| Entry {
                        id: EntryId::new(entry.id),
                        fields: entry
                            .map
                            .iter()
                            .filter_map(|(field, value)| {
                                Some((field.clone(), value_string(value)?))
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .filter(|batch: &TopicBatch| !batch.entries.is_empty())
            .collect();

        Ok(batches)
    }

    async fn ack(&self, topic: &str, group: &str, id: &EntryId) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .xack(topic, group, &[id.as_str()])
            .await
            .map_err(map_redis_err)?;
        Ok(())
    }

    async fn create_group(&self, topic: &str, group: &str, create_topic: bool) -> Result<()> {
        let mut conn = self.conn.clone();
        let res: redis::RedisResult<String> = if create_topic {
            conn.xgroup_create_mkstream(topic, group, "$").await
        } else {
            conn.xgroup_create(topic, group, "$").await
        };

        match res {
            Ok(_) => Ok(()),
            Err(err) if err.code() == Some("BUSYGROUP") => {
                let dup = StoreError::DuplicateGroup {
                    topic: topic.to_string(),
                    group: group.to_string(),
                };
                debug!(%dup, "treating as success");
                Ok(())
            }
            Err(err) => Err(map_redis_err(err)),
        }
    }

    async fn counter_incr(&self, set: &str, member: &str, delta: i64) -> Result<i64> {
        let mut conn = self.conn.clone();
        let value: f64 = conn
            .zincr(set, member, delta)
            .await
            .map_err(map_redis_err)?;
        Ok(value as i64)
    }

    async fn timeseries_add(
        &self,
        key: &str,
        timestamp_ms: i64,
        value: f64,
        labels: &[(String, String)],
    ) -> Result<()> {
        let mut cmd = redis::cmd("TS.ADD");
        cmd.arg(key)
            .arg(timestamp_ms)
            .arg(value)
            .arg("ON_DUPLICATE")
            .arg("LAST");
        if !labels.is_empty() {
            cmd.arg("LABELS");
            for (name, label) in labels {
                cmd.arg(name).arg(label);
            }
        }

        let mut conn = self.conn.clone();
        let _: i64 = cmd.query_async(&mut conn).await.map_err(map_redis_err)?;
        Ok(())
    }

    async fn timeseries_range(&self, query: &RangeQuery) -> Result<Vec<SeriesData>> {
        let mut cmd = redis::cmd("TS.MRANGE");
        match query.from {
            Some(from) => cmd.arg(from),
            None => cmd.arg("-"),
        };
        match query.to {
            Some(to) => cmd.arg(to),
            None => cmd.arg("+"),
        };
        cmd.arg("AGGREGATION")
            .arg(query.aggregation.as_str())
            .arg(query.bucket_ms)
            .arg("WITHLABELS")
            .arg("FILTER");
        for filter in &query.filters {
            cmd.arg(filter);
        }

        let mut conn = self.conn.clone();
        let reply: Value = cmd.query_async(&mut conn).await.map_err(map_redis_err)?;
        parse_mrange(reply)
    }

    async fn doc_set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("JSON.SET")
            .arg(key)
            .arg("$")
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_err)?;
        Ok(())
    }

    async fn doc_get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("JSON.GET")
            .arg(key)
            .arg("$")
            .query_async(&mut conn)
            .await
            .map_err(map_redis_err)?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        // JSON.GET with a `$` path wraps the document in an array.
        let mut values: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
        Ok(if values.is_empty() {
            None
        } else {
            Some(values.remove(0))
        })
    }

    async fn scan_set(&self, set: &str, cursor: u64) -> Result<(u64, Vec<String>)> {
        let mut conn = self.conn.clone();
        let (next, pairs): (u64, Vec<String>) = redis::cmd("ZSCAN")
            .arg(set)
            .arg(cursor)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_err)?;

        // ZSCAN interleaves members and scores.
        let members = pairs.into_iter().step_by(2).collect();
        Ok((next, members))
    }

    async fn health(&self) -> Result<serde_json::Value> {
        let mut conn = self.conn.clone();
        let info: String = redis::cmd("INFO")
            .query_async(&mut conn)
            .await
            .map_err(map_redis_err)?;

        let mut snapshot = serde_json::Map::new();
        snapshot.insert("backend".into(), "redis".into());
        for line in info.lines() {
            if let Some((key, value)) = line.split_once(':') {
                if matches!(
                    key,
                    "redis_version" | "uptime_in_seconds" | "connected_clients" | "used_memory_human"
                ) {
                    snapshot.insert(key.to_string(), value.trim().into());
                }
            }
        }
        Ok(serde_json::Value::Object(snapshot))
    }
}

/// Classify a redis error into the store taxonomy
///
/// Connection-level failures are transient (the manager reconnects);
/// anything the server rejected outright is a protocol error.
fn map_redis_err(err: redis::RedisError) -> StoreError {
    if err.is_io_error() || err.is_timeout() || err.is_connection_dropped() {
        StoreError::Transient(err.to_string())
    } else {
        StoreError::Protocol(err.to_string())
    }
}

/// Parse a TS.MRANGE reply
///
/// Shape: array of `[key, [[label, value], ...], [[ts, value], ...]]`.
fn parse_mrange(reply: Value) -> Result<Vec<SeriesData>> {
    let Value::Array(series) = reply else {
        return Err(StoreError::protocol("unexpected TS.MRANGE reply shape"));
    };

    let mut result = Vec::with_capacity(series.len());
    for entry in series {
        let Value::Array(parts) = entry else {
            continue;
        };
        let mut parts = parts.into_iter();
        let key = parts.next().and_then(|v| value_string(&v)).unwrap_or_default();
        let labels = parts.next().map(parse_labels).unwrap_or_default();
        let samples = parts.next().map(parse_samples).unwrap_or_default();

        let name = labels
            .iter()
            .find(|(label, _)| label == "log_level")
            .map(|(_, value)| value.clone())
            .unwrap_or(key);

        result.push(SeriesData { name, data: samples });
    }
    Ok(result)
}

fn parse_labels(value: Value) -> Vec<(String, String)> {
    let Value::Array(pairs) = value else {
        return Vec::new();
    };
    pairs
        .into_iter()
        .filter_map(|pair| {
            let Value::Array(kv) = pair else { return None };
            let mut kv = kv.into_iter();
            let name = value_string(&kv.next()?)?;
            let label = value_string(&kv.next()?)?;
            Some((name, label))
        })
        .collect()
}

fn parse_samples(value: Value) -> Vec<SamplePoint> {
    let Value::Array(samples) = value else {
        return Vec::new();
    };
    samples
        .into_iter()
        .filter_map(|sample| {
            let Value::Array(pair) = sample else { return None };
            let mut pair = pair.into_iter();
            let x = value_i64(&pair.next()?)?;
            let y = value_f64(&pair.next()?)?;
            Some(SamplePoint { x, y })
        })
        .collect()
}

fn value_string(value: &Value) -> Option<String> {
    match value {
        Value::BulkString(bytes) => String::from_utf8(bytes.clone()).ok(),
        Value::SimpleString(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Double(d) => Some(d.to_string()),
        _ => None,
    }
}

fn value_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Double(d) => Some(*d as i64),
        _ => value_string(value)?.parse().ok(),
    }
}

fn value_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Double(d) => Some(*d),
        _ => value_string(value)?.parse().ok(),
    }
}

#[cfg(test)]
#[path = "redis_test.rs"]
mod tests;
