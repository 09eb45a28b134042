//! Dashboard controller
//!
//! Owns the buffer, the status tracker, the notification center and the render
//! sink, and is the only code that mutates them. Everything else (push channel,
//! operator input, backend calls, dismiss timers) runs in separate tasks that
//! report back through channels, so one message is fully applied before the
//! next one is looked at.

use std::future::Future;
use std::ops::ControlFlow;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::client::{
    BackendClient, ClientError, CommandResponse, ControlCommand, SimulationParams,
    SnapshotLoader, StatusResponse,
};
use crate::config::DashboardConfig;
use crate::dashboard::action::{UserAction, HELP};
use crate::dashboard::history::TimeSeriesBuffer;
use crate::dashboard::notification::{Level, Notification, NotificationCenter};
use crate::dashboard::render::{MetricLabels, RenderSink};
use crate::dashboard::status::{ConnectionStatus, StatusTracker};
use crate::dashboard::types::{MetricSample, SeriesView};
use crate::stream::{StatusUpdate, StreamEvent, StreamHandle, StreamHandler, StreamSource, TransportEvent};

/// Bound on queued push events between the stream task and the controller
const STREAM_CHANNEL_CAPACITY: usize = 256;

/// Result of a backend call, delivered back to the controller loop
#[derive(Debug)]
pub enum Outcome {
    Connect(Result<CommandResponse, ClientError>),
    Disconnect(Result<CommandResponse, ClientError>),
    Control(ControlCommand, Result<CommandResponse, ClientError>),
    SetParams(Result<CommandResponse, ClientError>),
    Clear(Result<CommandResponse, ClientError>),
    Save(String, Result<CommandResponse, ClientError>),
    Status(Result<StatusResponse, ClientError>),
}

impl Outcome {
    pub fn command(&self) -> &'static str {
        match self {
            Outcome::Connect(_) => "connect",
            Outcome::Disconnect(_) => "disconnect",
            Outcome::Control(cmd, _) => cmd.as_str(),
            Outcome::SetParams(_) => "set_params",
            Outcome::Clear(_) => "clear",
            Outcome::Save(_, _) => "save",
            Outcome::Status(_) => "status",
        }
    }

    /// `success`, `failure` (backend said no) or `error` (call failed)
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Status(Ok(_)) => "success",
            Outcome::Status(Err(_)) => "error",
            Outcome::Connect(r)
            | Outcome::Disconnect(r)
            | Outcome::Control(_, r)
            | Outcome::SetParams(r)
            | Outcome::Clear(r)
            | Outcome::Save(_, r) => match r {
                Ok(resp) if resp.success => "success",
                Ok(_) => "failure",
                Err(_) => "error",
            },
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Outcome::Status(r) => r.as_ref().err(),
            Outcome::Connect(r)
            | Outcome::Disconnect(r)
            | Outcome::Control(_, r)
            | Outcome::SetParams(r)
            | Outcome::Clear(r)
            | Outcome::Save(_, r) => r.as_ref().err(),
        }
    }

    /// Operator-facing message for the outcome; status queries have none
    pub fn notification(&self) -> Option<Notification> {
        let n = match self {
            Outcome::Connect(r) => describe(
                r,
                "Connected to simulation successfully".to_string(),
                "Failed to connect".to_string(),
                "Error connecting to simulation".to_string(),
            ),
            Outcome::Disconnect(r) => describe(
                r,
                "Disconnected from simulation".to_string(),
                "Failed to disconnect".to_string(),
                "Error disconnecting from simulation".to_string(),
            ),
            Outcome::Control(cmd, r) => describe(
                r,
                format!("Simulation {} command sent successfully", cmd),
                format!("Failed to send {} command", cmd),
                format!("Error sending {} command", cmd),
            ),
            Outcome::SetParams(r) => describe(
                r,
                "Simulation parameters applied successfully".to_string(),
                "Failed to apply parameters".to_string(),
                "Error applying simulation parameters".to_string(),
            ),
            Outcome::Clear(r) => describe(
                r,
                "Data cleared successfully".to_string(),
                "Error clearing data".to_string(),
                "Error clearing data".to_string(),
            ),
            Outcome::Save(name, r) => describe(
                r,
                format!("Data saved as \"{}\"", name),
                "Error saving data".to_string(),
                "Error saving data".to_string(),
            ),
            Outcome::Status(_) => return None,
        };
        Some(n)
    }
}

fn describe(
    result: &Result<CommandResponse, ClientError>,
    success: String,
    failure: String,
    error: String,
) -> Notification {
    match result {
        Ok(resp) if resp.success => Notification::success(success),
        Ok(resp) => Notification::danger(format!("{}: {}", failure, resp.message_or_default())),
        Err(_) => Notification::danger(error),
    }
}

#[derive(Debug)]
enum Internal {
    Completed(Outcome),
    Dismiss(Uuid),
}

/// Root of the dashboard; one instance per session
pub struct DashboardController<S: RenderSink> {
    backend: BackendClient,
    config: DashboardConfig,
    buffer: TimeSeriesBuffer,
    status: StatusTracker,
    notifications: NotificationCenter,
    labels: MetricLabels,
    sink: S,
    inbox_tx: mpsc::UnboundedSender<Internal>,
    inbox_rx: mpsc::UnboundedReceiver<Internal>,
    stream: Option<StreamHandle>,
}

impl<S: RenderSink> DashboardController<S> {
    pub fn new(backend: BackendClient, config: DashboardConfig, sink: S) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            config,
            buffer: TimeSeriesBuffer::new(),
            status: StatusTracker::new(),
            notifications: NotificationCenter::new(),
            labels: MetricLabels::initial(),
            sink,
            inbox_tx,
            inbox_rx,
            stream: None,
        }
    }

    /// Startup sequence: sink, snapshot seed, push channel, initial status query.
    ///
    /// Returns the receiving end of the push channel.
    pub async fn start<Src: StreamSource>(&mut self, source: Src) -> mpsc::Receiver<StreamEvent> {
        self.sink.init();
        self.sink.render_status(&self.status.view());

        let loader = SnapshotLoader::new(self.backend.clone());
        if let Some(samples) = loader.load().await {
            self.apply_snapshot(samples);
        }

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        self.stream = Some(source.open(tx));

        self.dispatch(UserAction::CheckStatus);
        rx
    }

    /// Runs the session until `shutdown` fires or the operator quits, then
    /// closes the push channel. Returns the sink.
    pub async fn run<Src: StreamSource>(
        mut self,
        source: Src,
        mut actions: mpsc::Receiver<UserAction>,
        shutdown: CancellationToken,
    ) -> S {
        let mut events = self.start(source).await;
        let mut status_rx = self.status.subscribe();
        let mut events_open = true;
        let mut actions_open = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                event = events.recv(), if events_open => match event {
                    Some(event) => event.dispatch(&mut self),
                    None => {
                        tracing::debug!("Push channel closed");
                        events_open = false;
                    }
                },
                action = actions.recv(), if actions_open => match action {
                    Some(action) => {
                        if self.dispatch(action).is_break() {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("Operator input closed");
                        actions_open = false;
                    }
                },
                Some(message) = self.inbox_rx.recv() => self.handle_internal(message),
                changed = status_rx.changed() => {
                    if changed.is_ok() {
                        let view = status_rx.borrow_and_update().clone();
                        self.sink.render_status(&view);
                    }
                }
            }
        }

        self.teardown().await;
        self.sink
    }

    /// Releases the push channel; safe to call more than once
    pub async fn teardown(&mut self) {
        if let Some(stream) = self.stream.take() {
            tracing::debug!("Closing push channel");
            stream.close().await;
        }
    }

    /// Seeds the buffer from the startup backlog without overwriting live samples
    pub fn apply_snapshot(&mut self, samples: Vec<MetricSample>) {
        let offered = samples.len();
        let kept = self.buffer.merge_backlog(samples);
        tracing::debug!(offered, kept, live = self.buffer.appended(), "Applied initial data");
        self.render_data();
    }

    /// Translates an operator action into at most one backend call.
    ///
    /// The call runs in its own task; its outcome comes back through the inbox.
    pub fn dispatch(&mut self, action: UserAction) -> ControlFlow<()> {
        tracing::debug!(action = action.name(), "Operator action");
        match action {
            UserAction::Connect { host, port } => {
                let host = host.unwrap_or_else(|| self.config.default_host.clone());
                let port = port.unwrap_or(self.config.default_port);
                self.status.set_status(ConnectionStatus::Connecting);
                let client = self.backend.clone();
                self.spawn_call(async move { Outcome::Connect(client.connect(&host, port).await) });
            }
            UserAction::Disconnect => {
                let client = self.backend.clone();
                self.spawn_call(async move { Outcome::Disconnect(client.disconnect().await) });
            }
            UserAction::Control(cmd) => {
                let client = self.backend.clone();
                self.spawn_call(async move { Outcome::Control(cmd, client.control(cmd).await) });
            }
            UserAction::SetParams(params) => {
                let client = self.backend.clone();
                self.spawn_call(async move { set_params(client, params).await });
            }
            UserAction::Clear => {
                let client = self.backend.clone();
                self.spawn_call(async move { Outcome::Clear(client.clear().await) });
            }
            UserAction::Save { name } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    tracing::warn!("Save requested without a name, not sent");
                    return ControlFlow::Continue(());
                }
                let client = self.backend.clone();
                self.spawn_call(async move {
                    let result = client.save(&name).await;
                    Outcome::Save(name, result)
                });
            }
            UserAction::CheckStatus => {
                let client = self.backend.clone();
                self.spawn_call(async move { Outcome::Status(client.status().await) });
            }
            UserAction::Reconnect => match &self.stream {
                Some(stream) => stream.reconnect(),
                None => tracing::warn!("No push channel to reconnect"),
            },
            UserAction::Help => self.notify(Notification::new(Level::Info, HELP)),
            UserAction::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Waits for the next completed call or expired notification and applies it.
    ///
    /// Returns false if nothing can arrive anymore.
    pub async fn process_next(&mut self) -> bool {
        match self.inbox_rx.recv().await {
            Some(message) => {
                self.handle_internal(message);
                true
            }
            None => false,
        }
    }

    /// Shows a notification and schedules its dismissal
    pub fn notify(&mut self, notification: Notification) {
        match notification.level {
            Level::Danger => tracing::warn!(message = %notification.message, "Notification"),
            _ => tracing::info!(message = %notification.message, "Notification"),
        }

        let id = self.notifications.push(notification);
        self.sink.render_notifications(self.notifications.active());

        let tx = self.inbox_tx.clone();
        let ttl = self.config.notification_ttl();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if tx.send(Internal::Dismiss(id)).is_err() {
                tracing::trace!("Controller gone before notification expired");
            }
        });
    }

    pub fn buffer(&self) -> &TimeSeriesBuffer {
        &self.buffer
    }

    pub fn series(&self) -> SeriesView {
        self.buffer.snapshot()
    }

    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.active()
    }

    pub fn labels(&self) -> &MetricLabels {
        &self.labels
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn spawn_call<F>(&self, call: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let outcome = call.await;
            if tx.send(Internal::Completed(outcome)).is_err() {
                tracing::debug!("Controller gone before call completed");
            }
        });
    }

    fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::Completed(outcome) => self.apply_outcome(outcome),
            Internal::Dismiss(id) => {
                if self.notifications.dismiss(id) {
                    self.sink.render_notifications(self.notifications.active());
                }
            }
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        let command = outcome.command();
        metrics::counter!("simdash_commands_total", "command" => command, "outcome" => outcome.label())
            .increment(1);

        if let Some(e) = outcome.error() {
            tracing::error!(command, error = %e, "Backend call failed");
        }
        if let Some(notification) = outcome.notification() {
            self.notify(notification);
        }

        match outcome {
            Outcome::Connect(result) => self.status.set_status(match result {
                Ok(resp) if resp.success => ConnectionStatus::Connected,
                Ok(_) => ConnectionStatus::Disconnected,
                Err(_) => ConnectionStatus::Error,
            }),
            Outcome::Disconnect(Ok(resp)) if resp.success => {
                self.status.set_status(ConnectionStatus::Disconnected)
            }
            Outcome::Disconnect(Err(_)) => self.status.set_status(ConnectionStatus::Error),
            Outcome::Clear(Ok(resp)) if resp.success => {
                self.buffer.reset();
                self.sink.render_series(&self.buffer.snapshot());
            }
            Outcome::Status(Ok(resp)) => self.status.set_reported(&resp.status),
            Outcome::Status(Err(_)) => self.status.set_status(ConnectionStatus::Error),
            _ => {}
        }
    }

    fn render_data(&mut self) {
        self.sink.render_series(&self.buffer.snapshot());
        if let Some(latest) = self.buffer.latest() {
            self.labels = MetricLabels::from_sample(latest);
        }
        self.sink.render_metrics(&self.labels);
    }
}

impl<S: RenderSink> StreamHandler for DashboardController<S> {
    fn on_status(&mut self, update: StatusUpdate) {
        match update {
            StatusUpdate::Reported(raw) => {
                tracing::debug!(status = %raw, "Simulation status update");
                self.status.set_reported(&raw);
            }
            StatusUpdate::Transport(TransportEvent::Connected) => {
                tracing::info!("Live stream connected");
            }
            StatusUpdate::Transport(TransportEvent::Disconnected) => {
                tracing::info!("Live stream disconnected");
            }
            StatusUpdate::Transport(TransportEvent::ConnectError(error)) => {
                tracing::warn!(error = %error, "Live stream connection error");
                self.status.set_status(ConnectionStatus::Error);
            }
            StatusUpdate::Transport(TransportEvent::Exhausted) => {
                self.status.set_status(ConnectionStatus::Error);
                self.notify(Notification::danger(
                    "Live data stream unavailable, use 'reconnect' to retry",
                ));
            }
        }
    }

    fn on_data(&mut self, payload: serde_json::Value) {
        match MetricSample::from_event(&payload) {
            Ok(sample) => {
                metrics::counter!("simdash_samples_received_total").increment(1);
                self.buffer.append(sample);
                self.render_data();
            }
            Err(e) => {
                metrics::counter!("simdash_samples_dropped_total").increment(1);
                tracing::warn!(error = %e, "Dropping invalid new_data event");
            }
        }
    }
}

async fn set_params(client: BackendClient, params: SimulationParams) -> Outcome {
    Outcome::SetParams(client.set_params(&params).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use serde_json::json;

    #[derive(Default)]
    struct NullSink {
        series_renders: usize,
        last_labels: Option<MetricLabels>,
    }

    impl RenderSink for NullSink {
        fn render_series(&mut self, _series: &SeriesView) {
            self.series_renders += 1;
        }

        fn render_metrics(&mut self, labels: &MetricLabels) {
            self.last_labels = Some(labels.clone());
        }

        fn render_status(&mut self, _status: &crate::dashboard::status::StatusView) {}

        fn render_notifications(&mut self, _active: &[Notification]) {}
    }

    fn controller() -> DashboardController<NullSink> {
        let backend = BackendClient::new(BackendConfig {
            url: "http://127.0.0.1:9".to_string(),
            request_timeout_seconds: 1,
        })
        .unwrap();
        DashboardController::new(backend, DashboardConfig::default(), NullSink::default())
    }

    fn new_data(pdr: f64, time: &str) -> serde_json::Value {
        json!({"throughput": 1.0, "pdr": pdr, "eed": 5.0, "formatted_time": time})
    }

    #[tokio::test]
    async fn test_each_sample_is_rendered() {
        let mut c = controller();
        for i in 0..10 {
            c.on_data(new_data(i as f64 / 10.0, &format!("10:00:{:02}", i)));
        }

        assert_eq!(c.buffer().len(), 10);
        assert_eq!(c.buffer().oldest().unwrap().pdr(), 0.0);
        assert_eq!(c.buffer().latest().unwrap().pdr(), 0.9);
        assert_eq!(c.sink().series_renders, 10);
        assert_eq!(c.labels().pdr, "90.00%");
    }

    #[tokio::test]
    async fn test_missing_field_is_dropped() {
        let mut c = controller();
        c.on_data(new_data(0.5, "10:00:00"));
        c.on_data(json!({"throughput": 1.0, "pdr": 0.5, "formatted_time": "10:00:01"}));

        assert_eq!(c.buffer().len(), 1);
        assert_eq!(c.sink().series_renders, 1);
    }

    #[tokio::test]
    async fn test_connect_error_then_reported_connected() {
        let mut c = controller();
        c.on_status(StatusUpdate::Transport(TransportEvent::ConnectError(
            "refused".to_string(),
        )));
        assert_eq!(c.status().status(), ConnectionStatus::Error);

        c.on_status(StatusUpdate::Reported("connected".to_string()));
        assert_eq!(c.status().status(), ConnectionStatus::Connected);
        assert!(c.status().controls_enabled());
    }

    #[tokio::test]
    async fn test_transport_lifecycle_does_not_touch_status() {
        let mut c = controller();
        c.on_status(StatusUpdate::Reported("connected".to_string()));
        c.on_status(StatusUpdate::Transport(TransportEvent::Disconnected));
        c.on_status(StatusUpdate::Transport(TransportEvent::Connected));
        assert_eq!(c.status().status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_exhausted_sets_error_and_notifies() {
        let mut c = controller();
        c.on_status(StatusUpdate::Transport(TransportEvent::Exhausted));
        assert_eq!(c.status().status(), ConnectionStatus::Error);
        assert_eq!(c.notifications().len(), 1);
        assert_eq!(c.notifications()[0].level, Level::Danger);
    }

    #[tokio::test]
    async fn test_late_snapshot_does_not_stomp_live_data() {
        let mut c = controller();
        c.on_data(new_data(0.7, "10:00:05"));

        let backlog = (0..8)
            .map(|i| MetricSample::new(format!("10:00:0{}", i), 1.0, 0.1, 1.0).unwrap())
            .collect();
        c.apply_snapshot(backlog);

        let series = c.series();
        assert_eq!(series.len(), 6);
        assert_eq!(series.timestamps.last().unwrap(), "10:00:05");
        assert_eq!(series.pdr.last().copied(), Some(0.7));
        assert_eq!(c.labels().pdr, "70.00%");
    }

    #[tokio::test]
    async fn test_empty_save_name_is_not_sent() {
        let mut c = controller();
        let flow = c.dispatch(UserAction::Save {
            name: "  ".to_string(),
        });
        assert!(flow.is_continue());

        // Nothing was spawned, so nothing can complete
        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(50), c.process_next()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_quit_breaks() {
        let mut c = controller();
        assert!(c.dispatch(UserAction::Quit).is_break());
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifications_dismiss_after_ttl() {
        let mut c = controller();
        c.notify(Notification::success("Data cleared successfully"));
        assert_eq!(c.notifications().len(), 1);

        tokio::time::advance(std::time::Duration::from_millis(4999)).await;
        let early =
            tokio::time::timeout(std::time::Duration::from_millis(0), c.process_next()).await;
        assert!(early.is_err());
        assert_eq!(c.notifications().len(), 1);

        assert!(c.process_next().await);
        assert!(c.notifications().is_empty());
    }
}
