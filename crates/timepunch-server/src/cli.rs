//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// timepunch - timesheet front end with OAuth glue
#[derive(Debug, Parser)]
#[command(name = "timepunch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "TIMEPUNCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Override the listen address
    #[arg(long, env = "TIMEPUNCH_LISTEN")]
    pub listen: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server in the foreground (the default)
    Serve,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Token lifecycle commands
    Auth {
        #[command(subcommand)]
        action: AuthAction,
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

/// Token lifecycle actions.
#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Show whether a refresh token is stored
    Status,

    /// Print a valid access token (refreshing if needed)
    Token,

    /// Discard the stored refresh token
    Clear,
}
