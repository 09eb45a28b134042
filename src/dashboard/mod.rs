//! Live telemetry dashboard
//!
//! The [`DashboardController`] owns one [`TimeSeriesBuffer`], one
//! [`StatusTracker`] and one [`NotificationCenter`] for the session, routes
//! push events into them and hands read-only copies to a [`RenderSink`].

pub mod action;
pub mod controller;
pub mod history;
pub mod notification;
pub mod render;
pub mod status;
pub mod types;

pub use action::{ActionError, UserAction};
pub use controller::{DashboardController, Outcome};
pub use history::{TimeSeriesBuffer, MAX_CAPACITY};
pub use notification::{Level, Notification, NotificationCenter};
pub use render::{ConsoleSink, MetricLabels, RenderSink};
pub use status::{ConnectionStatus, Severity, StatusTracker, StatusView};
pub use types::{MetricSample, SampleError, SeriesView};
