//! simdash - live telemetry dashboard for a network simulation backend
//!
//! Seeds a bounded time series from the backend's recorded data, follows the
//! backend's push channel for new samples and status changes, and turns
//! operator actions into backend commands.

pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod stream;
