//! Watch command implementation

use std::io::BufRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cli::WatchArgs;
use crate::client::BackendClient;
use crate::config::SimdashConfig;
use crate::dashboard::{ConsoleSink, DashboardController, UserAction};
use crate::stream::LiveStreamClient;

const ACTION_CHANNEL_CAPACITY: usize = 16;

/// Reads one operator action per line until EOF or `quit`.
///
/// Blocks the calling thread, so it must not run on a runtime worker. Lines
/// that do not parse are reported on stderr and never reach the controller.
pub fn read_actions<R>(input: R, actions: mpsc::Sender<UserAction>)
where
    R: BufRead,
{
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read operator input");
                return;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<UserAction>() {
            Ok(action) => {
                let quit = action == UserAction::Quit;
                if actions.blocking_send(action).is_err() || quit {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(input = %line.trim(), error = %e, "Ignoring operator input");
                eprintln!("{}", e);
            }
        }
    }
    tracing::debug!("Operator input reached EOF");
}

/// Spawns the stdin reader on its own OS thread.
///
/// A read blocked on an open terminal cannot be interrupted, so the thread is
/// detached and never joined; it ends with the process.
fn spawn_stdin_reader(actions: mpsc::Sender<UserAction>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("simdash-stdin".to_string())
        .spawn(move || read_actions(std::io::stdin().lock(), actions))?;
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Main watch command handler
pub async fn run_watch(
    mut config: SimdashConfig,
    args: &WatchArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(url) = &args.stream_url {
        config.stream.url = Some(url.clone());
        config.validate()?;
    }

    let client = BackendClient::new(config.backend.clone())?;
    let stream = LiveStreamClient::new(config.stream_url(), config.stream.clone());
    tracing::info!(
        backend = %client.base_url(),
        stream = %stream.url(),
        "Starting dashboard"
    );

    let (action_tx, action_rx) = mpsc::channel(ACTION_CHANNEL_CAPACITY);
    let cancel_token = CancellationToken::new();
    spawn_stdin_reader(action_tx)?;
    let signals = tokio::spawn(shutdown_signal(cancel_token.clone()));

    let controller = DashboardController::new(client, config.dashboard.clone(), ConsoleSink::stdout());
    controller.run(stream, action_rx, cancel_token).await;

    signals.abort();
    tracing::info!("Dashboard stopped");

    Ok(())
}
