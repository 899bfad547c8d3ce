//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// enginelink - inspect a running engine over its debug socket
#[derive(Debug, Parser)]
#[command(name = "enginelink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "ENGINELINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Engine address (overrides connection.address)
    #[arg(long, global = true)]
    pub address: Option<String>,

    /// Engine port (overrides connection.port)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// WebSocket path (overrides connection.path)
    #[arg(long, global = true)]
    pub path: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect to one or more engines and read commands from stdin
    Connect {
        /// Endpoints as host[:port]; defaults to the configured endpoint
        endpoints: Vec<String>,
    },

    /// Decode one envelope and print its JSON body
    Decode {
        /// The text frame, e.g. "SocketLogMessage,-,eyJ..."
        envelope: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
