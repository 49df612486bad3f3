//! Topic and consumer-group naming
//!
//! Shared by the splitter and the viewer side: the raw ingestion
//! topic, the two role groups, and the retention cap applied to
//! per-severity topics.

use serde::Deserialize;

/// Stream naming configuration
///
/// # Example
///
/// ```toml
/// [stream]
/// raw_topic = "ingest"
/// splitter_group = "splitter"
/// viewer_group = "viewers"
/// maxlen = 2000000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Raw ingestion topic producers append to
    /// Default: ingest
    pub raw_topic: String,

    /// Consumer group for the splitter's read of the raw topic
    /// Default: splitter
    pub splitter_group: String,

    /// Consumer group shared by all viewer sessions
    /// Default: viewers
    pub viewer_group: String,

    /// Approximate retention cap on per-severity topics
    /// Default: 2000000
    pub maxlen: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            raw_topic: "ingest".to_string(),
            splitter_group: "splitter".to_string(),
            viewer_group: "viewers".to_string(),
            maxlen: 2_000_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.raw_topic, "ingest");
        assert_eq!(config.splitter_group, "splitter");
        assert_eq!(config.viewer_group, "viewers");
        assert_eq!(config.maxlen, 2_000_000);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: StreamConfig = toml::from_str("raw_topic = \"logs-in\"").unwrap();
        assert_eq!(config.raw_topic, "logs-in");
        assert_eq!(config.viewer_group, "viewers");
    }
}
