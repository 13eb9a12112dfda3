//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod logs;
mod probe;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show the aggregated logs of a set of pods
    Logs {
        /// Pod identifiers
        #[arg(required = true)]
        pods: Vec<String>,
    },
    /// Open gRPC channels to a set of endpoints and report the outcome
    Probe {
        /// Endpoint addresses (host:port)
        #[arg(required = true)]
        addresses: Vec<String>,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Logs { pods } => {
            let client = config.log_client()?;
            logs::show_logs(&client, &pods).await
        }
        Commands::Probe { addresses } => probe::probe_addresses(config, &addresses).await,
    }
}
