//! Splitter tuning

use serde::Deserialize;

/// Splitter loop configuration
///
/// # Example
///
/// ```toml
/// [splitter]
/// batch_size = 100
/// block_ms = 1000
/// idle_ms = 500
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SplitterSection {
    /// Entries per grouped read of the raw topic
    /// Default: 100
    pub batch_size: usize,

    /// Bounded block per read, in milliseconds
    /// Default: 1000
    pub block_ms: u64,

    /// Idle interval while the splitter gate is disabled, in milliseconds
    /// Default: 500
    pub idle_ms: u64,
}

impl Default for SplitterSection {
    fn default() -> Self {
        Self {
            batch_size: 100,
            block_ms: 1000,
            idle_ms: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SplitterSection::default();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.block_ms, 1000);
        assert_eq!(config.idle_ms, 500);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SplitterSection = toml::from_str("batch_size = 50").unwrap();
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.block_ms, 1000);
    }
}
