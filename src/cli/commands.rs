//! One-shot backend commands
//!
//! Each handler issues exactly one backend call and returns the line to print.
//! A backend refusal or transport failure comes back as `Err` so the binary
//! exits non-zero.

use crate::cli::output::{
    format_notification, format_samples_json, format_samples_table, format_status,
    format_status_json,
};
use crate::cli::{ConnectArgs, ControlArgs, DataArgs, JsonArgs, SaveArgs, SetParamsArgs};
use crate::client::{BackendClient, SimulationParams};
use crate::config::DashboardConfig;
use crate::dashboard::action::ActionError;
use crate::dashboard::controller::Outcome;
use crate::dashboard::notification::Level;

type CommandResult = Result<String, Box<dyn std::error::Error>>;

/// Handle `simdash status`
pub async fn handle_status(client: &BackendClient, args: &JsonArgs) -> CommandResult {
    let response = client.status().await?;
    if args.json {
        Ok(format_status_json(&response.status)?)
    } else {
        Ok(format_status(&response.status))
    }
}

/// Handle `simdash connect [host] [port]`
pub async fn handle_connect(
    client: &BackendClient,
    defaults: &DashboardConfig,
    args: &ConnectArgs,
) -> CommandResult {
    let host = args.host.as_deref().unwrap_or(&defaults.default_host);
    let port = args.port.unwrap_or(defaults.default_port);
    tracing::info!(host, port, "Connecting backend to simulation");
    finish(Outcome::Connect(client.connect(host, port).await))
}

/// Handle `simdash disconnect`
pub async fn handle_disconnect(client: &BackendClient) -> CommandResult {
    finish(Outcome::Disconnect(client.disconnect().await))
}

/// Handle `simdash control <command>`
pub async fn handle_control(client: &BackendClient, args: &ControlArgs) -> CommandResult {
    finish(Outcome::Control(
        args.command,
        client.control(args.command).await,
    ))
}

/// Handle `simdash set-params`
pub async fn handle_set_params(client: &BackendClient, args: &SetParamsArgs) -> CommandResult {
    let params = SimulationParams::from(args);
    finish(Outcome::SetParams(client.set_params(&params).await))
}

/// Handle `simdash clear`
pub async fn handle_clear(client: &BackendClient) -> CommandResult {
    finish(Outcome::Clear(client.clear().await))
}

/// Handle `simdash save <name>`
pub async fn handle_save(client: &BackendClient, args: &SaveArgs) -> CommandResult {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(ActionError::EmptyName.into());
    }
    finish(Outcome::Save(name.to_string(), client.save(name).await))
}

/// Handle `simdash data`
pub async fn handle_data(client: &BackendClient, args: &DataArgs) -> CommandResult {
    let mut samples = client.current_data().await?.into_samples()?;
    if let Some(last) = args.last {
        let skip = samples.len().saturating_sub(last);
        samples.drain(..skip);
    }

    if args.json {
        Ok(format_samples_json(&samples)?)
    } else if samples.is_empty() {
        Ok("No data recorded yet".to_string())
    } else {
        Ok(format_samples_table(&samples))
    }
}

fn finish(outcome: Outcome) -> CommandResult {
    let notification = match outcome.notification() {
        Some(n) => n,
        None => return Ok(String::new()),
    };

    match (notification.level, outcome.error()) {
        (Level::Danger, Some(e)) => Err(format!("{}: {}", notification.message, e).into()),
        (Level::Danger, None) => Err(notification.message.into()),
        _ => Ok(format_notification(&notification)),
    }
}
