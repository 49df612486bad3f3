//! Sift Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use sift_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[store]\nurl = \"redis://db:6379\"").unwrap();
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [store]
//! url = "redis://127.0.0.1:6379"
//!
//! [stream]
//! raw_topic = "ingest"
//!
//! [splitter]
//! batch_size = 100
//!
//! [viewer]
//! heartbeat_secs = 5
//!
//! [api]
//! bind = "127.0.0.1:8080"
//! ```

mod api;
mod error;
mod logging;
mod splitter;
mod store;
mod stream;
mod validation;
mod viewer;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use api::ApiConfig;
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use splitter::SplitterSection;
pub use store::StoreConfig;
pub use stream::StreamConfig;
pub use viewer::ViewerSection;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Log store connection
    pub store: StoreConfig,

    /// Topic and group naming
    pub stream: StreamConfig,

    /// Splitter tuning
    pub splitter: SplitterSection,

    /// Viewer delivery tuning
    pub viewer: ViewerSection,

    /// HTTP surface
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid
    /// TOML, or fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.store.url, "redis://127.0.0.1:6379");
        assert_eq!(config.stream.raw_topic, "ingest");
        assert_eq!(config.splitter.batch_size, 100);
        assert_eq!(config.viewer.heartbeat_secs, 5);
        assert_eq!(config.api.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[log]
level = "debug"
format = "json"

[store]
url = "redis://db:6380"

[stream]
raw_topic = "firehose"
maxlen = 1000

[splitter]
batch_size = 10
block_ms = 250

[viewer]
heartbeat_secs = 3

[api]
bind = "0.0.0.0:9000"
"#;
        let config = Config::from_str(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.store.url, "redis://db:6380");
        assert_eq!(config.stream.raw_topic, "firehose");
        assert_eq!(config.stream.maxlen, 1000);
        assert_eq!(config.splitter.batch_size, 10);
        assert_eq!(config.viewer.heartbeat_secs, 3);
        assert_eq!(config.api.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_unknown_section_rejected() {
        // Typos in section names should not silently disappear.
        assert!(Config::from_str("[sttore]\nurl = \"x\"").is_err());
    }
}
