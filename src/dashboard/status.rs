//! Connection / simulation status tracking
//!
//! The backend reports simulation status as free-form strings and the push
//! channel reports transport lifecycle events. Both land here and are folded
//! into a single [`ConnectionStatus`] that drives the indicator and control
//! enablement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// Current connection/simulation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Visual severity of a status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Neutral,
    Warning,
    Danger,
}

/// Status -> severity. Every variant has exactly one row.
const SEVERITY_TABLE: [(ConnectionStatus, Severity); 4] = [
    (ConnectionStatus::Connected, Severity::Success),
    (ConnectionStatus::Disconnected, Severity::Neutral),
    (ConnectionStatus::Connecting, Severity::Warning),
    (ConnectionStatus::Error, Severity::Danger),
];

impl ConnectionStatus {
    /// Maps a backend status string onto the enumeration.
    ///
    /// Unrecognized values fall back to `Disconnected` (the neutral visual).
    pub fn from_reported(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "connected" => ConnectionStatus::Connected,
            "connecting" => ConnectionStatus::Connecting,
            "error" => ConnectionStatus::Error,
            _ => ConnectionStatus::Disconnected,
        }
    }

    pub fn severity(self) -> Severity {
        SEVERITY_TABLE
            .iter()
            .find(|(status, _)| *status == self)
            .map(|(_, severity)| *severity)
            .unwrap_or(Severity::Neutral)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which operator controls are currently usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub connect: bool,
    pub disconnect: bool,
    /// start / stop / pause / resume / set-params
    pub commands: bool,
}

/// Point-in-time view of the tracker, published to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub status: ConnectionStatus,
    /// Display label, capitalized (e.g. "Connected", or an unrecognized backend value)
    pub label: String,
    pub severity: Severity,
    pub controls: Controls,
    pub since: DateTime<Utc>,
}

/// Holds the current status and notifies subscribers on every assignment
#[derive(Debug)]
pub struct StatusTracker {
    status: ConnectionStatus,
    reported: String,
    since: DateTime<Utc>,
    tx: watch::Sender<StatusView>,
}

impl StatusTracker {
    pub fn new() -> Self {
        let status = ConnectionStatus::Disconnected;
        let since = Utc::now();
        let reported = status.as_str().to_string();
        let (tx, _) = watch::channel(build_view(status, &reported, since));
        Self {
            status,
            reported,
            since,
            tx,
        }
    }

    /// Assigns a new status and notifies subscribers
    pub fn set_status(&mut self, new: ConnectionStatus) {
        self.apply(new, new.as_str().to_string());
    }

    /// Applies a status string reported by the backend
    pub fn set_reported(&mut self, raw: &str) {
        let status = ConnectionStatus::from_reported(raw);
        if status == ConnectionStatus::Disconnected
            && !raw.trim().eq_ignore_ascii_case("disconnected")
        {
            tracing::debug!(reported = raw, "Unrecognized status value, showing as neutral");
        }
        let label = if raw.trim().is_empty() {
            status.as_str().to_string()
        } else {
            raw.trim().to_string()
        };
        self.apply(status, label);
    }

    fn apply(&mut self, status: ConnectionStatus, reported: String) {
        if status != self.status {
            tracing::info!(from = %self.status, to = %status, "Status transition");
            self.since = Utc::now();
        }
        self.status = status;
        self.reported = reported;
        self.tx.send_replace(self.view());
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn severity(&self) -> Severity {
        self.status.severity()
    }

    /// Commands are enabled only while connected
    pub fn controls_enabled(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Time of the last transition
    pub fn since(&self) -> DateTime<Utc> {
        self.since
    }

    pub fn view(&self) -> StatusView {
        build_view(self.status, &self.reported, self.since)
    }

    /// Receiver that observes every `set_status` / `set_reported`
    pub fn subscribe(&self) -> watch::Receiver<StatusView> {
        self.tx.subscribe()
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn build_view(status: ConnectionStatus, reported: &str, since: DateTime<Utc>) -> StatusView {
    let connected = status == ConnectionStatus::Connected;
    StatusView {
        status,
        label: capitalize(reported),
        severity: status.severity(),
        controls: Controls {
            connect: !connected,
            disconnect: connected,
            commands: connected,
        },
        since,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
