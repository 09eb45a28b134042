//! Backend (request/response) configuration

use serde::{Deserialize, Serialize};

/// Where the simulation backend listens for HTTP calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://127.0.0.1:5000`
    pub url: String,
    pub request_timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5000".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl BackendConfig {
    /// Join an API path onto the base URL without doubling slashes
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
