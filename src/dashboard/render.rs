//! Rendering sink interface and the terminal implementation

use colored::Colorize;
use std::collections::HashSet;
use std::io::Write;
use uuid::Uuid;

use crate::dashboard::notification::{Level, Notification};
use crate::dashboard::status::{Severity, StatusView};
use crate::dashboard::types::{MetricSample, SeriesView};

/// Consumer of buffer snapshots and dashboard state.
///
/// Every method receives owned or borrowed copies; a sink can never reach
/// the controller's live buffer.
pub trait RenderSink: Send {
    /// Called once before any other method
    fn init(&mut self) {}

    fn render_series(&mut self, series: &SeriesView);

    fn render_metrics(&mut self, labels: &MetricLabels);

    fn render_status(&mut self, status: &StatusView);

    /// Full set of currently visible notifications
    fn render_notifications(&mut self, active: &[Notification]);
}

/// Summary labels for the three metric cards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricLabels {
    pub throughput: String,
    pub pdr: String,
    pub eed: String,
}

impl MetricLabels {
    /// Labels shown before the first sample arrives
    pub fn initial() -> Self {
        Self {
            throughput: "0 Mbps".to_string(),
            pdr: "0%".to_string(),
            eed: "0 ms".to_string(),
        }
    }

    pub fn from_sample(sample: &MetricSample) -> Self {
        Self {
            throughput: format!("{:.2} Mbps", sample.throughput()),
            pdr: format!("{:.2}%", sample.pdr() * 100.0),
            eed: format!("{:.2} ms", sample.eed()),
        }
    }
}

impl Default for MetricLabels {
    fn default() -> Self {
        Self::initial()
    }
}

const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_WIDTH: usize = 20;

/// Compact unicode sparkline of the newest `width` values
pub fn sparkline(values: &[f64], width: usize) -> String {
    let start = values.len().saturating_sub(width);
    let window = &values[start..];
    if window.is_empty() {
        return String::new();
    }

    let min = window.iter().copied().fold(f64::INFINITY, f64::min);
    let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    window
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                SPARK_CHARS[0]
            } else {
                let idx = ((v - min) / span * (SPARK_CHARS.len() - 1) as f64).round() as usize;
                SPARK_CHARS[idx.min(SPARK_CHARS.len() - 1)]
            }
        })
        .collect()
}

/// Line-oriented terminal sink
pub struct ConsoleSink<W: Write + Send> {
    out: W,
    series: SeriesView,
    shown: HashSet<Uuid>,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            series: SeriesView::default(),
            shown: HashSet::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: String) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            tracing::debug!(error = %e, "Console sink write failed");
        }
    }
}

impl<W: Write + Send> RenderSink for ConsoleSink<W> {
    fn init(&mut self) {
        let labels = MetricLabels::initial();
        self.line(format!(
            "{}  throughput {}  pdr {}  eed {}",
            "simdash".bold(),
            labels.throughput,
            labels.pdr,
            labels.eed
        ));
    }

    fn render_series(&mut self, series: &SeriesView) {
        if series.is_empty() && !self.series.is_empty() {
            self.line("series cleared".dimmed().to_string());
        }
        self.series = series.clone();
    }

    fn render_metrics(&mut self, labels: &MetricLabels) {
        let time = self.series.timestamps.last().cloned().unwrap_or_default();
        let line = format!(
            "[{}] throughput {:>12} {}  pdr {:>8} {}  eed {:>10} {}  ({} pts)",
            time,
            labels.throughput.cyan(),
            sparkline(&self.series.throughput, SPARK_WIDTH),
            labels.pdr.green(),
            sparkline(&self.series.pdr, SPARK_WIDTH),
            labels.eed.magenta(),
            sparkline(&self.series.eed, SPARK_WIDTH),
            self.series.len()
        );
        self.line(line);
    }

    fn render_status(&mut self, status: &StatusView) {
        let badge = match status.severity {
            Severity::Success => status.label.green(),
            Severity::Neutral => status.label.white(),
            Severity::Warning => status.label.yellow(),
            Severity::Danger => status.label.red(),
        };
        let controls = if status.controls.commands {
            "controls enabled"
        } else {
            "controls disabled"
        };
        self.line(format!("status: {} ({})", badge.bold(), controls.dimmed()));
    }

    fn render_notifications(&mut self, active: &[Notification]) {
        let mut fresh = Vec::new();
        for n in active {
            if self.shown.insert(n.id) {
                fresh.push(n.clone());
            }
        }
        self.shown.retain(|id| active.iter().any(|n| n.id == *id));

        for n in fresh {
            let text = match n.level {
                Level::Success => format!("✓ {}", n.message).green(),
                Level::Info => format!("• {}", n.message).normal(),
                Level::Danger => format!("✗ {}", n.message).red(),
            };
            self.line(text.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_labels() {
        let labels = MetricLabels::initial();
        assert_eq!(labels.throughput, "0 Mbps");
        assert_eq!(labels.pdr, "0%");
        assert_eq!(labels.eed, "0 ms");
    }

    #[test]
    fn test_labels_from_sample() {
        let sample = MetricSample::new("t2", 2.0, 0.95, 12.0).unwrap();
        let labels = MetricLabels::from_sample(&sample);
        assert_eq!(labels.throughput, "2.00 Mbps");
        assert_eq!(labels.pdr, "95.00%");
        assert_eq!(labels.eed, "12.00 ms");
    }

    #[test]
    fn test_sparkline_scales_to_range() {
        let line = sparkline(&[0.0, 5.0, 10.0], 20);
        assert_eq!(line, "▁▅█");
        assert_eq!(sparkline(&[], 20), "");
        assert_eq!(sparkline(&[3.0, 3.0], 20), "▁▁");
    }

    #[test]
    fn test_sparkline_uses_newest_window() {
        let values: Vec<f64> = (0..30).map(|v| v as f64).collect();
        assert_eq!(sparkline(&values, 5).chars().count(), 5);
    }

    #[test]
    fn test_console_sink_prints_each_notification_once() {
        colored::control::set_override(false);
        let mut sink = ConsoleSink::new(Vec::new());
        let n = Notification::danger("Failed to send pause command: not connected");

        sink.render_notifications(std::slice::from_ref(&n));
        sink.render_notifications(std::slice::from_ref(&n));
        sink.render_notifications(&[]);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out.matches("Failed to send pause command").count(), 1);
    }

    #[test]
    fn test_console_sink_metrics_line() {
        colored::control::set_override(false);
        let mut sink = ConsoleSink::new(Vec::new());
        let sample = MetricSample::new("12:00:00", 1.5, 0.5, 8.0).unwrap();
        let series: SeriesView = std::iter::once(&sample).collect();

        sink.render_series(&series);
        sink.render_metrics(&MetricLabels::from_sample(&sample));

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.contains("[12:00:00]"));
        assert!(out.contains("50.00%"));
        assert!(out.contains("(1 pts)"));
    }
}
