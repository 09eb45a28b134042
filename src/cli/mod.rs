//! CLI module for simdash
//!
//! # Commands
//!
//! - `watch` - Live dashboard, operator commands read from stdin
//! - `status` - Show the simulation status
//! - `connect` / `disconnect` - Attach the backend to a simulation
//! - `control` - Send start/stop/pause/resume
//! - `set-params` - Apply simulation parameters
//! - `clear` / `save` - Manage recorded data
//! - `data` - Print the recorded series
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Follow the default backend
//! simdash watch
//!
//! # Pause a simulation on another host
//! simdash --url http://sim-host:5000 control pause
//!
//! # Generate shell completions
//! simdash completions bash > ~/.bash_completion.d/simdash
//! ```

pub mod commands;
pub mod completions;
pub mod config;
pub mod output;
pub mod watch;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::client::{ControlCommand, SimulationParams};
use crate::config::SimdashConfig;

pub const DEFAULT_CONFIG_PATH: &str = "simdash.toml";

/// simdash - live telemetry dashboard for network simulations
#[derive(Parser, Debug)]
#[command(
    name = "simdash",
    version,
    about = "Live telemetry dashboard for a network simulation backend"
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override the backend URL
    #[arg(short, long, global = true)]
    pub url: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the live dashboard
    Watch(WatchArgs),
    /// Show the simulation status
    Status(JsonArgs),
    /// Connect the backend to a simulation
    Connect(ConnectArgs),
    /// Disconnect the backend from the simulation
    Disconnect,
    /// Send a simulation control command
    Control(ControlArgs),
    /// Apply simulation parameters
    SetParams(SetParamsArgs),
    /// Clear the backend's recorded data
    Clear,
    /// Save the backend's recorded data under a name
    Save(SaveArgs),
    /// Print the backend's recorded series
    Data(DataArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Override the push channel URL (ws:// or wss://)
    #[arg(long)]
    pub stream_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct JsonArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Simulation host (defaults to dashboard.default_host)
    pub host: Option<String>,

    /// Simulation port (defaults to dashboard.default_port)
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct ControlArgs {
    #[arg(value_enum)]
    pub command: ControlCommand,
}

#[derive(Args, Debug)]
pub struct SetParamsArgs {
    /// Node mobility speed
    #[arg(long, default_value_t = 0.0)]
    pub mobility_speed: f64,

    /// Number of nodes
    #[arg(long, default_value_t = 0)]
    pub node_count: u32,

    /// Packet size in bytes
    #[arg(long, default_value_t = 0)]
    pub packet_size: u32,

    /// Transmission power
    #[arg(long, default_value_t = 0.0)]
    pub tx_power: f64,
}

impl From<&SetParamsArgs> for SimulationParams {
    fn from(args: &SetParamsArgs) -> Self {
        Self {
            mobility_speed: args.mobility_speed,
            node_count: args.node_count,
            packet_size: args.packet_size,
            tx_power: args.tx_power,
        }
    }
}

#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Name to save the data under
    pub name: String,
}

#[derive(Args, Debug)]
pub struct DataArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show only the newest N samples
    #[arg(short = 'n', long)]
    pub last: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load configuration with CLI overrides
///
/// A missing file is only an error when the path was set explicitly.
pub fn load_config_with_overrides(
    path: &Path,
    url: Option<&str>,
    log_level: Option<&str>,
) -> Result<SimdashConfig, Box<dyn std::error::Error>> {
    let mut config = if path.exists() {
        SimdashConfig::load(Some(path))?
    } else if path == Path::new(DEFAULT_CONFIG_PATH) {
        tracing::debug!("Config file not found, using defaults");
        SimdashConfig::default()
    } else {
        return Err(crate::config::ConfigError::NotFound(path.to_path_buf()).into());
    };

    config = config.with_env_overrides();

    if let Some(url) = url {
        config.backend.url = url.to_string();
    }
    if let Some(level) = log_level {
        config.logging.level = level.to_string();
    }

    config.validate()?;
    Ok(config)
}
