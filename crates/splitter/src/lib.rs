//! Sift Splitter - raw ingestion topic fan-out
//!
//! One long-lived background task drains the raw ingestion topic and,
//! for every event: republishes it to the topic named by its
//! lower-cased severity, bumps the severity counter, records a
//! time-series sample, archives the full event, and only then
//! acknowledges the source entry. An entry that was read but not yet
//! acknowledged is redelivered after a restart, so upstream ingestion
//! is at-least-once.
//!
//! The splitter does nothing until its [`SplitterGate`] is enabled by
//! operator action, and performs no backend reads while idle.

pub mod gate;
pub mod metrics;
pub mod splitter;

pub use gate::SplitterGate;
pub use metrics::{SplitterMetrics, SplitterSnapshot};
pub use splitter::{SplitterConfig, StreamSplitter};
