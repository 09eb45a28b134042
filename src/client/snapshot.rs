//! One-shot backlog fetch used to seed the dashboard at startup.

use super::BackendClient;
use crate::dashboard::types::MetricSample;

/// Fetches the backend's current series once
#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    client: BackendClient,
}

impl SnapshotLoader {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// Returns the backlog, or `None` when there is nothing usable.
    ///
    /// Failures are logged and swallowed; the dashboard keeps running on the
    /// live stream alone. No retry.
    pub async fn load(&self) -> Option<Vec<MetricSample>> {
        let data = match self.client.current_data().await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load initial data");
                return None;
            }
        };

        if data.is_empty() {
            tracing::debug!("Backend has no recorded data yet");
            return None;
        }

        match data.into_samples() {
            Ok(samples) if samples.is_empty() => {
                tracing::warn!("Initial data contained no valid samples");
                None
            }
            Ok(samples) => {
                tracing::info!(samples = samples.len(), "Loaded initial data");
                Some(samples)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load initial data");
                None
            }
        }
    }
}
