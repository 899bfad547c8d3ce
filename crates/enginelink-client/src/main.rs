//! enginelink CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use enginelink_client::cli::{Cli, Command, ConfigAction};
use enginelink_client::commands;
use enginelink_client::config::ClientConfig;
use enginelink_client::error::{ClientError, ClientResult};
use enginelink_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().unwrap_or_default()
    };
    let config = config.with_overrides(cli.address, cli.port, cli.path);

    // The config file may ask for debug output too.
    let base = if cli.debug || config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    init_tracing(config.logging.apply(base))
        .map_err(|e| ClientError::Config(e.to_string()))?;

    match cli.command {
        None => commands::connect::run(&config, &[]).await,
        Some(Command::Connect { endpoints }) => commands::connect::run(&config, &endpoints).await,
        Some(Command::Decode { envelope }) => commands::decode::run(&config, &envelope),
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
