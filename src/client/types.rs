//! Wire types for the backend HTTP API

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ClientError;
use crate::dashboard::types::MetricSample;

/// Simulation run control command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ControlCommand {
    Start,
    Stop,
    Pause,
    Resume,
}

impl ControlCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlCommand::Start => "start",
            ControlCommand::Stop => "stop",
            ControlCommand::Pause => "pause",
            ControlCommand::Resume => "resume",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(ControlCommand::Start),
            "stop" => Ok(ControlCommand::Stop),
            "pause" => Ok(ControlCommand::Pause),
            "resume" => Ok(ControlCommand::Resume),
            _ => Err(format!("Invalid control command: {}", s)),
        }
    }
}

/// Parameters sent with `set_params`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// m/s
    pub mobility_speed: f64,
    pub node_count: u32,
    /// bytes
    pub packet_size: u32,
    /// dBm
    pub tx_power: f64,
}

/// Body of `POST /api/simulation/connect`
#[derive(Debug, Serialize)]
pub(crate) struct ConnectRequest<'a> {
    pub host: &'a str,
    pub port: u16,
}

/// Body of `POST /api/simulation/control`
#[derive(Debug, Serialize)]
pub(crate) struct ControlRequest<'a> {
    pub command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<&'a SimulationParams>,
}

/// Body of `POST /api/data/save`
#[derive(Debug, Serialize)]
pub(crate) struct SaveRequest<'a> {
    pub name: &'a str,
}

/// Generic `{success, message}` response of every command endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Control calls answer with a `result` instead of a message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl CommandResponse {
    /// Message for display, empty when the backend sent none
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// `GET /api/simulation/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// `GET /api/data/current`: parallel arrays, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentData {
    pub throughput: Vec<f64>,
    pub pdr: Vec<f64>,
    pub eed: Vec<f64>,
    /// Pre-formatted labels, or epoch seconds from older backends
    pub timestamps: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl CurrentData {
    pub fn len(&self) -> usize {
        self.throughput.len()
    }

    pub fn is_empty(&self) -> bool {
        self.throughput.is_empty()
    }

    /// Zips the parallel arrays into samples.
    ///
    /// Arrays of unequal length are rejected outright. Entries that fail sample
    /// validation are skipped.
    pub fn into_samples(self) -> Result<Vec<MetricSample>, ClientError> {
        let n = self.throughput.len();
        if self.pdr.len() != n || self.eed.len() != n || self.timestamps.len() != n {
            return Err(ClientError::Decode(format!(
                "series length mismatch: throughput={} pdr={} eed={} timestamps={}",
                n,
                self.pdr.len(),
                self.eed.len(),
                self.timestamps.len()
            )));
        }

        let mut samples = Vec::with_capacity(n);
        for (i, ts) in self.timestamps.iter().enumerate() {
            let Some(label) = timestamp_label(ts) else {
                tracing::debug!(index = i, value = %ts, "Skipping snapshot entry with bad timestamp");
                continue;
            };
            match MetricSample::new(label, self.throughput[i], self.pdr[i], self.eed[i]) {
                Ok(sample) => samples.push(sample),
                Err(e) => tracing::debug!(index = i, error = %e, "Skipping invalid snapshot entry"),
            }
        }
        Ok(samples)
    }
}

/// Display label for a snapshot timestamp; epoch seconds become local `HH:MM:SS`
fn timestamp_label(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => {
            let secs = n.as_f64()?;
            let whole = secs.trunc() as i64;
            let nanos = ((secs.fract()) * 1e9) as u32;
            let utc = chrono::DateTime::from_timestamp(whole, nanos)?;
            Some(
                utc.with_timezone(&chrono::Local)
                    .format("%H:%M:%S")
                    .to_string(),
            )
        }
        _ => None,
    }
}
