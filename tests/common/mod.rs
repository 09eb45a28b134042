//! Shared test utilities for simdash integration tests.
//!
//! Provides a recording render sink, backend builders and mock-backend
//! helpers to reduce duplication across test files.

#![allow(dead_code)]

use serde_json::{json, Value};
use simdash::client::BackendClient;
use simdash::config::BackendConfig;
use simdash::dashboard::{MetricLabels, Notification, RenderSink, SeriesView, StatusView};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Recording sink
// =============================================================================

/// Everything a sink was asked to show, in call order
#[derive(Debug, Default, Clone)]
pub struct Frames {
    pub inits: usize,
    pub series: Vec<SeriesView>,
    pub metrics: Vec<MetricLabels>,
    pub statuses: Vec<StatusView>,
    pub notifications: Vec<Vec<Notification>>,
}

impl Frames {
    pub fn last_series(&self) -> Option<&SeriesView> {
        self.series.last()
    }

    pub fn last_metrics(&self) -> Option<&MetricLabels> {
        self.metrics.last()
    }

    /// Every message that was ever visible
    pub fn messages(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for frame in &self.notifications {
            for n in frame {
                if !seen.contains(&n.message) {
                    seen.push(n.message.clone());
                }
            }
        }
        seen
    }
}

/// Sink that shares its frames with the test through a mutex
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub frames: Arc<Mutex<Frames>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Frames {
        self.frames.lock().unwrap().clone()
    }
}

impl RenderSink for RecordingSink {
    fn init(&mut self) {
        self.frames.lock().unwrap().inits += 1;
    }

    fn render_series(&mut self, series: &SeriesView) {
        self.frames.lock().unwrap().series.push(series.clone());
    }

    fn render_metrics(&mut self, labels: &MetricLabels) {
        self.frames.lock().unwrap().metrics.push(labels.clone());
    }

    fn render_status(&mut self, status: &StatusView) {
        self.frames.lock().unwrap().statuses.push(status.clone());
    }

    fn render_notifications(&mut self, active: &[Notification]) {
        self.frames
            .lock()
            .unwrap()
            .notifications
            .push(active.to_vec());
    }
}

// =============================================================================
// Backend helpers
// =============================================================================

/// Client for a mock server with a short timeout
pub fn backend_for(uri: &str) -> BackendClient {
    BackendClient::new(BackendConfig {
        url: uri.to_string(),
        request_timeout_seconds: 5,
    })
    .unwrap()
}

/// Client pointed at a port nothing listens on
pub fn unreachable_backend() -> BackendClient {
    backend_for("http://127.0.0.1:9")
}

/// `/api/data/current` body with `n` samples at 12:00:00, 12:00:01, ...
pub fn current_data_body(n: usize, pdr: f64) -> Value {
    json!({
        "throughput": vec![2.5; n],
        "pdr": vec![pdr; n],
        "eed": vec![11.0; n],
        "timestamps": (0..n).map(|i| format!("12:{:02}:{:02}", i / 60, i % 60)).collect::<Vec<_>>(),
        "status": "connected",
    })
}

/// `new_data` payload
pub fn new_data(throughput: f64, pdr: f64, eed: f64, time: &str) -> Value {
    json!({
        "throughput": throughput,
        "pdr": pdr,
        "eed": eed,
        "formatted_time": time,
    })
}

pub async fn mount_json(server: &MockServer, verb: &str, route: &str, status: u16, body: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Mock backend with empty data and a disconnected simulation
pub async fn idle_backend() -> MockServer {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/api/data/current", 200, current_data_body(0, 0.0)).await;
    mount_json(
        &server,
        "GET",
        "/api/simulation/status",
        200,
        json!({"status": "disconnected"}),
    )
    .await;
    server
}

/// Polls `check` until it holds or two seconds pass
pub async fn wait_for<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
