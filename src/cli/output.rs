//! Output formatting helpers for CLI commands

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

use crate::dashboard::notification::{Level, Notification};
use crate::dashboard::status::{ConnectionStatus, Severity};
use crate::dashboard::types::MetricSample;

/// Format a backend-reported status for the terminal
pub fn format_status(raw: &str) -> String {
    let status = ConnectionStatus::from_reported(raw);
    let label = match status.severity() {
        Severity::Success => raw.green(),
        Severity::Neutral => raw.normal(),
        Severity::Warning => raw.yellow(),
        Severity::Danger => raw.red(),
    };
    format!("{} {}", status_icon(status), label)
}

/// Format a backend-reported status as JSON
pub fn format_status_json(raw: &str) -> Result<String, serde_json::Error> {
    let status = ConnectionStatus::from_reported(raw);
    serde_json::to_string_pretty(&json!({
        "status": raw,
        "state": status,
        "severity": status.severity(),
    }))
}

/// Format a command outcome notification as a single line
pub fn format_notification(notification: &Notification) -> String {
    match notification.level {
        Level::Success => format!("✓ {}", notification.message).green().to_string(),
        Level::Info => notification.message.clone(),
        Level::Danger => format!("✗ {}", notification.message).red().to_string(),
    }
}

/// Format recorded samples as a table
pub fn format_samples_table(samples: &[MetricSample]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Throughput (Mbps)", "PDR (%)", "EED (ms)"]);

    for s in samples {
        table.add_row(vec![
            Cell::new(s.timestamp()),
            Cell::new(format!("{:.2}", s.throughput())),
            Cell::new(format!("{:.2}", s.pdr() * 100.0)),
            Cell::new(format!("{:.2}", s.eed())),
        ]);
    }

    table.to_string()
}

/// Format recorded samples as JSON
pub fn format_samples_json(samples: &[MetricSample]) -> Result<String, serde_json::Error> {
    let rows: Vec<_> = samples
        .iter()
        .map(|s| {
            json!({
                "timestamp": s.timestamp(),
                "throughput": s.throughput(),
                "pdr": s.pdr(),
                "eed": s.eed(),
            })
        })
        .collect();
    serde_json::to_string_pretty(&json!({ "samples": rows }))
}

/// Get status icon for a connection status
pub fn status_icon(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connected => "✓",
        ConnectionStatus::Error => "✗",
        ConnectionStatus::Connecting => "~",
        ConnectionStatus::Disconnected => "-",
    }
}
