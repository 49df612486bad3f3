//! Viewer delivery tuning

use serde::Deserialize;

/// Per-session delivery loop configuration
///
/// # Example
///
/// ```toml
/// [viewer]
/// heartbeat_secs = 5
/// empty_idle_ms = 1000
/// block_ms = 1000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerSection {
    /// Silence threshold before a heartbeat round-trip, in seconds
    /// Default: 5
    pub heartbeat_secs: u64,

    /// Sleep while a session's subscription set is empty, in milliseconds
    /// Default: 1000
    pub empty_idle_ms: u64,

    /// Bounded block per grouped read, in milliseconds
    /// Default: 1000
    pub block_ms: u64,
}

impl Default for ViewerSection {
    fn default() -> Self {
        Self {
            heartbeat_secs: 5,
            empty_idle_ms: 1000,
            block_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerSection::default();
        assert_eq!(config.heartbeat_secs, 5);
        assert_eq!(config.empty_idle_ms, 1000);
        assert_eq!(config.block_ms, 1000);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ViewerSection = toml::from_str("heartbeat_secs = 10").unwrap();
        assert_eq!(config.heartbeat_secs, 10);
        assert_eq!(config.block_ms, 1000);
    }
}
