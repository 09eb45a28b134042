use clap::Parser;
use simdash::cli::{
    commands, handle_completions, handle_config_init, load_config_with_overrides, watch, Cli,
    Commands, ConfigCommands,
};
use simdash::client::BackendClient;
use simdash::config::SimdashConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Config(ConfigCommands::Init(args)) => handle_config_init(args).map(Some),
        Commands::Completions(args) => {
            handle_completions(args);
            Ok(None)
        }
        command => match setup(&cli) {
            Ok(config) => run(command, config).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(Some(output)) if !output.is_empty() => println!("{}", output),
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn setup(cli: &Cli) -> Result<SimdashConfig, Box<dyn std::error::Error>> {
    let config =
        load_config_with_overrides(&cli.config, cli.url.as_deref(), cli.log_level.as_deref())?;
    simdash::logging::init_tracing(&config.logging)?;
    tracing::debug!(config = %cli.config.display(), "Configuration loaded");
    Ok(config)
}

async fn run(
    command: &Commands,
    config: SimdashConfig,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if let Commands::Watch(args) = command {
        watch::run_watch(config, args).await?;
        return Ok(None);
    }

    let client = BackendClient::new(config.backend.clone())?;
    let output = match command {
        Commands::Status(args) => commands::handle_status(&client, args).await?,
        Commands::Connect(args) => {
            commands::handle_connect(&client, &config.dashboard, args).await?
        }
        Commands::Disconnect => commands::handle_disconnect(&client).await?,
        Commands::Control(args) => commands::handle_control(&client, args).await?,
        Commands::SetParams(args) => commands::handle_set_params(&client, args).await?,
        Commands::Clear => commands::handle_clear(&client).await?,
        Commands::Save(args) => commands::handle_save(&client, args).await?,
        Commands::Data(args) => commands::handle_data(&client, args).await?,
        Commands::Watch(_) | Commands::Config(_) | Commands::Completions(_) => String::new(),
    };
    Ok(Some(output))
}
