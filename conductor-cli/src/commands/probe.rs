//! Probe command handler
//!
//! Opens one gRPC channel per address through the connection registry,
//! reports which ones could be established, then drains the registry.

use anyhow::Result;
use colored::*;
use conductor_client::{Connection, ConnectionRegistry, GrpcRegistry};

use crate::config::Config;

/// Probe each address and print a per-address outcome
pub async fn probe_addresses(config: &Config, addresses: &[String]) -> Result<()> {
    let registry = GrpcRegistry::new(config.connection_factory());

    let failures = register_all(&registry, addresses).await;
    let connected = registry.snapshot().await.len();

    println!();
    println!(
        "{}",
        format!("{} of {} endpoint(s) reachable", connected, addresses.len()).bold()
    );

    drain(&registry).await;

    if failures > 0 {
        anyhow::bail!("{} endpoint(s) could not be reached", failures);
    }

    Ok(())
}

/// Adds every address, returning how many failed
async fn register_all<C: Connection>(
    registry: &ConnectionRegistry<C>,
    addresses: &[String],
) -> usize {
    let mut failures = 0;

    for address in addresses {
        match registry.add(address).await {
            Ok(_) => println!("  {} {}", "✓".green(), address),
            Err(e) => {
                failures += 1;
                println!("  {} {} {}", "✗".red(), address, e.to_string().dimmed());
            }
        }
    }

    failures
}

/// Removes every registered connection
async fn drain<C: Connection>(registry: &ConnectionRegistry<C>) {
    for address in registry.addresses().await {
        if let Err(e) = registry.remove(&address).await {
            tracing::warn!("Failed to close connection {}: {}", address, e);
        }
    }
}
