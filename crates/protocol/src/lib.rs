//! Sift Protocol - shared event model and wire types
//!
//! This crate defines the vocabulary shared by the splitter, the viewer
//! delivery path, and the HTTP surface:
//!
//! - [`Event`] - the immutable log event record
//! - [`Frame`] - the JSON frames pushed to connected viewers
//! - key construction for counters, time series, and the archive
//! - [`DecodeError`] - what can go wrong turning raw fields back into
//!   an event
//!
//! Events travel through the log store as a single `json` field holding
//! the serialized event object; a frame is only built after that field
//! has fully decoded.

pub mod error;
pub mod event;
pub mod frame;
pub mod keys;

pub use error::DecodeError;
pub use event::{Event, severity_topic};
pub use frame::{Frame, PingData};
pub use keys::{SEVERITY_COUNTER_SET, SPLITTER_FLAG_KEY, archive_key, day_bucket, ts_key};

/// Field name carrying the serialized event in a stream entry
pub const EVENT_FIELD: &str = "json";
