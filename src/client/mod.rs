//! Request/response client for the simulation backend.
//!
//! Thin wrappers around the backend HTTP API. Each method performs exactly one
//! call and never retries; command endpoints hand back the backend's
//! `{success, message}` verdict even when it arrives with a 4xx/5xx status.

mod error;
pub mod snapshot;
mod types;

pub use error::*;
pub use snapshot::SnapshotLoader;
pub use types::*;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::config::BackendConfig;

pub const CURRENT_DATA_PATH: &str = "/api/data/current";
pub const STATUS_PATH: &str = "/api/simulation/status";
pub const CONNECT_PATH: &str = "/api/simulation/connect";
pub const DISCONNECT_PATH: &str = "/api/simulation/disconnect";
pub const CONTROL_PATH: &str = "/api/simulation/control";
pub const CLEAR_PATH: &str = "/api/data/clear";
pub const SAVE_PATH: &str = "/api/data/save";

/// HTTP client bound to one backend; cheap to clone
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    config: BackendConfig,
}

impl BackendClient {
    /// Create a client with connection pooling and the configured timeout.
    pub fn new(config: BackendConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Create a client around an existing reqwest client (for testing).
    pub fn with_client(config: BackendConfig, client: reqwest::Client) -> Self {
        Self { client, config }
    }

    pub fn base_url(&self) -> &str {
        &self.config.url
    }

    /// `GET /api/data/current`
    pub async fn current_data(&self) -> Result<CurrentData, ClientError> {
        let url = self.config.endpoint(CURRENT_DATA_PATH);
        let response = self.send(self.client.get(&url), &url).await?;
        decode_success(response).await
    }

    /// `GET /api/simulation/status`
    pub async fn status(&self) -> Result<StatusResponse, ClientError> {
        let url = self.config.endpoint(STATUS_PATH);
        let response = self.send(self.client.get(&url), &url).await?;
        decode_success(response).await
    }

    /// `POST /api/simulation/connect {host, port}`
    pub async fn connect(&self, host: &str, port: u16) -> Result<CommandResponse, ClientError> {
        self.post_command(CONNECT_PATH, &ConnectRequest { host, port })
            .await
    }

    /// `POST /api/simulation/disconnect {}`
    pub async fn disconnect(&self) -> Result<CommandResponse, ClientError> {
        self.post_command(DISCONNECT_PATH, &serde_json::json!({}))
            .await
    }

    /// `POST /api/simulation/control {command}`
    pub async fn control(&self, command: ControlCommand) -> Result<CommandResponse, ClientError> {
        let body = ControlRequest {
            command: command.as_str(),
            params: None,
        };
        self.post_command(CONTROL_PATH, &body).await
    }

    /// `POST /api/simulation/control {command: "set_params", params}`
    pub async fn set_params(
        &self,
        params: &SimulationParams,
    ) -> Result<CommandResponse, ClientError> {
        let body = ControlRequest {
            command: "set_params",
            params: Some(params),
        };
        self.post_command(CONTROL_PATH, &body).await
    }

    /// `GET /api/data/clear`
    pub async fn clear(&self) -> Result<CommandResponse, ClientError> {
        let url = self.config.endpoint(CLEAR_PATH);
        let response = self.send(self.client.get(&url), &url).await?;
        decode_command(response).await
    }

    /// `POST /api/data/save {name}`
    pub async fn save(&self, name: &str) -> Result<CommandResponse, ClientError> {
        self.post_command(SAVE_PATH, &SaveRequest { name }).await
    }

    async fn post_command<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<CommandResponse, ClientError> {
        let url = self.config.endpoint(path);
        let response = self.send(self.client.post(&url).json(body), &url).await?;
        decode_command(response).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<Response, ClientError> {
        tracing::debug!(url = %url, "Backend request");
        request.send().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

async fn decode_success<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Http {
            status: status.as_u16(),
        });
    }
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Command endpoints report failures as `{success: false, message}` with a
/// 4xx/5xx status, so the body is honored whatever the status.
async fn decode_command(response: Response) -> Result<CommandResponse, ClientError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))?;

    match serde_json::from_str::<CommandResponse>(&body) {
        Ok(parsed) => Ok(parsed),
        Err(_) if !status.is_success() => Err(ClientError::Http {
            status: status.as_u16(),
        }),
        Err(e) => Err(ClientError::Decode(e.to_string())),
    }
}
