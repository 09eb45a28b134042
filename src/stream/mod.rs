//! Live push-channel client
//!
//! Keeps one logical WebSocket connection to the backend and turns its frames
//! into typed [`StreamEvent`]s on an mpsc channel. Frames are delivered in the
//! order the backend sent them; nothing is buffered or replayed while the
//! connection is down.
//!
//! # Reconnection
//!
//! After a failed attempt or a dropped connection the client waits
//! `retry_delay_ms` and tries again. `max_attempts` consecutive failed attempts
//! put it in the terminal [`TransportEvent::Exhausted`] state, where it idles
//! until [`StreamHandle::reconnect`] or [`StreamHandle::close`].

pub mod frame;

pub use frame::{parse_frame, FrameError};

use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

use crate::config::StreamConfig;

/// Counter of failed connection attempts, manual restarts excluded
pub const CONNECT_FAILURES_METRIC: &str = "simdash_stream_connect_failures_total";

/// Transport lifecycle of the push channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed (`connect`)
    Connected,
    /// Connection attempt failed (`connect_error`)
    ConnectError(String),
    /// Established connection ended (`disconnect`)
    Disconnected,
    /// Gave up after the configured number of attempts
    Exhausted,
}

/// Status-affecting push events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Transport(TransportEvent),
    /// `connection_status {status}` as reported by the backend
    Reported(String),
}

/// One inbound push-channel event
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Status(StatusUpdate),
    /// Raw `new_data` payload, validated by the consumer
    Data(serde_json::Value),
}

impl StreamEvent {
    /// Routes the event to the matching handler method
    pub fn dispatch<H: StreamHandler + ?Sized>(self, handler: &mut H) {
        match self {
            StreamEvent::Status(update) => handler.on_status(update),
            StreamEvent::Data(payload) => handler.on_data(payload),
        }
    }
}

/// Single consumer of push events, one method per event kind
pub trait StreamHandler {
    fn on_status(&mut self, update: StatusUpdate);

    fn on_data(&mut self, payload: serde_json::Value);
}

/// Anything that can feed push events into the controller
pub trait StreamSource: Send + 'static {
    /// Starts producing events into `events`; the handle owns the producer.
    fn open(self, events: mpsc::Sender<StreamEvent>) -> StreamHandle;
}

/// Owner of a running event producer.
///
/// Dropping the handle cancels the producer; [`close`](Self::close) also waits
/// for it to finish.
#[derive(Debug)]
pub struct StreamHandle {
    cancel: CancellationToken,
    reconnect: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl StreamHandle {
    pub fn new(cancel: CancellationToken, reconnect: Arc<Notify>, task: JoinHandle<()>) -> Self {
        Self {
            cancel,
            reconnect,
            task: Some(task),
        }
    }

    /// Requests a fresh connection attempt and resets the failure count
    pub fn reconnect(&self) {
        self.reconnect.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancels the producer and waits for it to release the connection
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Push channel task ended abnormally");
            }
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Forwards events from an existing channel, e.g. a recorded or scripted feed
pub struct ChannelSource(pub mpsc::Receiver<StreamEvent>);

impl StreamSource for ChannelSource {
    fn open(self, events: mpsc::Sender<StreamEvent>) -> StreamHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let mut rx = self.0;
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    next = rx.recv() => match next {
                        Some(event) => {
                            if events.send(event).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        });
        StreamHandle::new(cancel, Arc::new(Notify::new()), task)
    }
}

enum Pump {
    Cancelled,
    Dropped,
    Reconnect,
}

/// WebSocket push-channel client with bounded reconnection
#[derive(Debug, Clone)]
pub struct LiveStreamClient {
    url: String,
    config: StreamConfig,
}

impl LiveStreamClient {
    pub fn new(url: impl Into<String>, config: StreamConfig) -> Self {
        Self {
            url: url.into(),
            config,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn run(
        self,
        events: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
        reconnect: Arc<Notify>,
    ) {
        let mut failures: u32 = 0;

        loop {
            tracing::debug!(url = %self.url, attempt = failures + 1, "Connecting to push channel");
            let attempt = tokio::select! {
                _ = cancel.cancelled() => break,
                _ = reconnect.notified() => {
                    tracing::info!("Reconnect requested during handshake, restarting attempt");
                    failures = 0;
                    continue;
                }
                result = connect_async(self.url.as_str()) => result,
            };

            match attempt {
                Ok((ws, response)) => {
                    failures = 0;
                    tracing::info!(url = %self.url, status = %response.status(), "Push channel connected");
                    if !emit(&events, transport(TransportEvent::Connected)).await {
                        break;
                    }

                    match pump(ws, &events, &cancel, &reconnect).await {
                        Pump::Cancelled => break,
                        Pump::Reconnect => {
                            tracing::info!("Push channel reconnect requested");
                            if !emit(&events, transport(TransportEvent::Disconnected)).await {
                                break;
                            }
                            continue;
                        }
                        Pump::Dropped => {
                            tracing::warn!(url = %self.url, "Push channel disconnected");
                            if !emit(&events, transport(TransportEvent::Disconnected)).await {
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    metrics::counter!(CONNECT_FAILURES_METRIC).increment(1);
                    tracing::warn!(
                        url = %self.url,
                        error = %e,
                        attempt = failures,
                        max_attempts = self.config.max_attempts,
                        "Push channel connection failed"
                    );
                    if !emit(&events, transport(TransportEvent::ConnectError(e.to_string()))).await {
                        break;
                    }

                    if failures >= self.config.max_attempts {
                        tracing::error!(
                            url = %self.url,
                            attempts = failures,
                            "Max reconnect attempts exceeded, giving up"
                        );
                        if !emit(&events, transport(TransportEvent::Exhausted)).await {
                            break;
                        }
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = reconnect.notified() => {
                                tracing::info!("Manual reconnect after giving up");
                                failures = 0;
                                continue;
                            }
                        }
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.retry_delay()) => {}
                _ = reconnect.notified() => {
                    failures = 0;
                }
            }
        }

        tracing::debug!(url = %self.url, "Push channel task stopped");
    }
}

impl StreamSource for LiveStreamClient {
    fn open(self, events: mpsc::Sender<StreamEvent>) -> StreamHandle {
        let cancel = CancellationToken::new();
        let reconnect = Arc::new(Notify::new());
        let task = tokio::spawn(self.run(events, cancel.clone(), Arc::clone(&reconnect)));
        StreamHandle::new(cancel, reconnect, task)
    }
}

fn transport(event: TransportEvent) -> StreamEvent {
    StreamEvent::Status(StatusUpdate::Transport(event))
}

/// Returns false once the consumer is gone
async fn emit(events: &mpsc::Sender<StreamEvent>, event: StreamEvent) -> bool {
    events.send(event).await.is_ok()
}

async fn pump<S>(
    ws: tokio_tungstenite::WebSocketStream<S>,
    events: &mpsc::Sender<StreamEvent>,
    cancel: &CancellationToken,
    reconnect: &Notify,
) -> Pump
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    tracing::debug!(error = %e, "Close frame not sent");
                }
                return Pump::Cancelled;
            }
            _ = reconnect.notified() => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    tracing::debug!(error = %e, "Close frame not sent");
                }
                return Pump::Reconnect;
            }
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => match parse_frame(&text) {
                    Ok(Some(event)) => {
                        if !emit(events, event).await {
                            return Pump::Cancelled;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        metrics::counter!("simdash_frames_dropped_total").increment(1);
                        tracing::warn!(error = %e, "Dropping malformed push frame");
                    }
                },
                Some(Ok(Message::Close(_))) | None => return Pump::Dropped,
                Some(Ok(Message::Ping(data))) => {
                    tracing::trace!(len = data.len(), "Push channel ping");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Push channel read error");
                    return Pump::Dropped;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        statuses: Vec<StatusUpdate>,
        data: Vec<serde_json::Value>,
    }

    impl StreamHandler for Recorder {
        fn on_status(&mut self, update: StatusUpdate) {
            self.statuses.push(update);
        }

        fn on_data(&mut self, payload: serde_json::Value) {
            self.data.push(payload);
        }
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let mut recorder = Recorder::default();
        transport(TransportEvent::Connected).dispatch(&mut recorder);
        StreamEvent::Data(json!({"pdr": 1.0})).dispatch(&mut recorder);

        assert_eq!(
            recorder.statuses,
            vec![StatusUpdate::Transport(TransportEvent::Connected)]
        );
        assert_eq!(recorder.data.len(), 1);
    }

    #[tokio::test]
    async fn test_channel_source_preserves_order() {
        let (script_tx, script_rx) = mpsc::channel(16);
        let (tx, mut rx) = mpsc::channel(16);
        let handle = ChannelSource(script_rx).open(tx);

        for i in 0..5 {
            script_tx
                .send(StreamEvent::Data(json!({ "seq": i })))
                .await
                .unwrap();
        }
        for i in 0..5 {
            match rx.recv().await.unwrap() {
                StreamEvent::Data(v) => assert_eq!(v["seq"], json!(i)),
                other => panic!("unexpected {:?}", other),
            }
        }

        handle.close().await;
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels() {
        let (_script_tx, script_rx) = mpsc::channel::<StreamEvent>(1);
        let (tx, _rx) = mpsc::channel(1);
        let handle = ChannelSource(script_rx).open(tx);
        let token = handle.cancel.clone();

        drop(handle);
        assert!(token.is_cancelled());
    }
}
