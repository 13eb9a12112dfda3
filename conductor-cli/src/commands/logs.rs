//! Logs command handler
//!
//! Fetches the aggregated logs of a pod set and prints one line per entry.

use anyhow::{Context, Result};
use colored::*;
use conductor_client::LogClient;
use conductor_core::domain::log::LogEntries;

/// Fetch and display logs for the given pods
pub async fn show_logs(client: &dyn LogClient, pods: &[String]) -> Result<()> {
    let logs = fetch_logs(client, pods).await?;

    if logs.is_empty() {
        println!("{}", "No logs found for these pods.".yellow());
        return Ok(());
    }

    println!("{}", format!("Logs for {}:", pods.join(", ")).bold());
    println!("{}", "─".repeat(80).dimmed());
    for line in &logs {
        println!("{}", line);
    }
    println!("{}", "─".repeat(80).dimmed());

    Ok(())
}

async fn fetch_logs(client: &dyn LogClient, pods: &[String]) -> Result<LogEntries> {
    client
        .logs(pods)
        .await
        .with_context(|| format!("Failed to get logs for pods [{}]", pods.join(", ")))
}
