//! Error types for backend calls.

use thiserror::Error;

/// Errors from a request/response call to the simulation backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    /// Connection refused, timeout, reset...
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx status without a usable JSON body
    #[error("backend returned HTTP {status}")]
    Http { status: u16 },

    /// Body could not be decoded into the expected shape
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }
}
