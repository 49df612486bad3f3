//! Log store connection configuration

use serde::Deserialize;

/// Backend connection settings
///
/// # Example
///
/// ```toml
/// [store]
/// url = "redis://10.0.0.5:6379"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Connection URL for the log store
    /// Default: redis://127.0.0.1:6379
    pub url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}
