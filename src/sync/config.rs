//! Reconciler configuration.

use serde::{Deserialize, Serialize};

/// Settings for the remote reconciliation loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the remote posts collection.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Seconds between periodic sync runs.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds. A hung request fails the cycle
    /// instead of stalling it until the next trigger.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://jsonplaceholder.typicode.com".to_string()
}
fn default_poll_interval_secs() -> u64 {
    30
}
fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.request_timeout_secs, 10);
        assert!(config.base_url.starts_with("https://"));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: SyncConfig =
            serde_json::from_str(r#"{"base_url": "http://localhost:3000"}"#).unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.poll_interval_secs, 30);
    }
}
