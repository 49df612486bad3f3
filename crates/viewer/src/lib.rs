//! Sift Viewer - connection management and live delivery
//!
//! The viewer side of sift multiplexes any number of concurrently
//! connected clients over the per-severity topics:
//!
//! - [`ConnectionManager`] is the single authority over session
//!   lifecycle, subscription mutation, and topic discovery
//! - [`SeverityRegistry`] derives the known severities from the
//!   counter store on each refresh
//! - [`DeliveryLoop`] runs per session: heartbeat round-trips, bounded
//!   grouped reads, and frame push over the session's [`Transport`]
//!
//! Sessions share no mutable state with each other; everything they
//! touch goes through the manager. A stalled or dead client affects
//! only its own loop.

pub mod delivery;
pub mod error;
pub mod manager;
pub mod registry;
pub mod session;
pub mod transport;

pub use delivery::DeliveryLoop;
pub use error::{Result, ViewerError};
pub use manager::{ConnectionManager, ViewerConfig};
pub use registry::SeverityRegistry;
pub use session::{Session, SessionId, SessionState};
pub use transport::{ChannelTransport, Transport, TransportPeer};
