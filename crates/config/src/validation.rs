//! Configuration validation
//!
//! Catches unusable values at load time instead of at first use.

use crate::error::{ConfigError, Result};
use crate::Config;

impl Config {
    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<()> {
        if self.stream.raw_topic.is_empty() {
            return Err(ConfigError::invalid_value(
                "stream",
                "raw_topic",
                "must not be empty",
            ));
        }
        if self.stream.splitter_group.is_empty() {
            return Err(ConfigError::invalid_value(
                "stream",
                "splitter_group",
                "must not be empty",
            ));
        }
        if self.stream.viewer_group.is_empty() {
            return Err(ConfigError::invalid_value(
                "stream",
                "viewer_group",
                "must not be empty",
            ));
        }
        if self.stream.splitter_group == self.stream.viewer_group {
            return Err(ConfigError::invalid_value(
                "stream",
                "viewer_group",
                "splitter and viewer groups must be distinct roles",
            ));
        }
        if self.splitter.batch_size == 0 {
            return Err(ConfigError::invalid_value(
                "splitter",
                "batch_size",
                "must be at least 1",
            ));
        }
        if self.splitter.block_ms == 0 {
            return Err(ConfigError::invalid_value(
                "splitter",
                "block_ms",
                "must be non-zero to bound reads",
            ));
        }
        if self.viewer.block_ms == 0 {
            return Err(ConfigError::invalid_value(
                "viewer",
                "block_ms",
                "must be non-zero to bound reads",
            ));
        }
        if self.viewer.heartbeat_secs == 0 {
            return Err(ConfigError::invalid_value(
                "viewer",
                "heartbeat_secs",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_empty_raw_topic() {
        let config = Config::from_str("[stream]\nraw_topic = \"\"").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_shared_group_name() {
        let config = Config::from_str(
            "[stream]\nsplitter_group = \"same\"\nviewer_group = \"same\"",
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("distinct"));
    }

    #[test]
    fn test_rejects_zero_batch() {
        let config = Config::from_str("[splitter]\nbatch_size = 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unbounded_viewer_read() {
        let config = Config::from_str("[viewer]\nblock_ms = 0").unwrap();
        assert!(config.validate().is_err());
    }
}
