//! Conductor CLI
//!
//! Operator-facing command-line interface for the conductor control plane.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "conductor")]
#[command(about = "Conductor control-plane CLI", long_about = None)]
struct Cli {
    /// Log service URL
    #[arg(long, env = "CONDUCTOR_LOG_URL", default_value = "http://localhost:8080")]
    log_url: String,

    /// gRPC dial timeout in seconds
    #[arg(long, env = "CONDUCTOR_CONNECT_TIMEOUT", default_value_t = 5)]
    connect_timeout: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "CONDUCTOR_REQUEST_TIMEOUT", default_value_t = 30)]
    request_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr, command output to stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conductor_cli=info,conductor_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        log_url: cli.log_url,
        connect_timeout: Duration::from_secs(cli.connect_timeout),
        request_timeout: Duration::from_secs(cli.request_timeout),
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}
