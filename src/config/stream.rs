//! Push channel configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Push channel endpoint and reconnection policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// WebSocket URL; derived from the backend URL when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Fixed delay between reconnection attempts
    pub retry_delay_ms: u64,
    /// Consecutive failed attempts before the client gives up
    pub max_attempts: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: None,
            retry_delay_ms: 1000,
            max_attempts: 10,
        }
    }
}

impl StreamConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Resolve the WebSocket URL, deriving `ws(s)://<host>/ws` from the backend URL
    pub fn resolve_url(&self, backend_url: &str) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        let base = backend_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}/ws", ws_base)
    }
}
