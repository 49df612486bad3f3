//! HTTP surface configuration

use serde::Deserialize;

/// Bind settings for the control surface and WebSocket endpoint
///
/// # Example
///
/// ```toml
/// [api]
/// bind = "0.0.0.0:8080"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Address the HTTP server listens on
    /// Default: 127.0.0.1:8080
    pub bind: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}
