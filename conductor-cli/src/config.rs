//! Configuration module
//!
//! Handles CLI configuration including the log service URL and network
//! timeouts.

use anyhow::{Context, Result};
use conductor_client::{GrpcConnectionFactory, RestLogClient};
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the log-forwarder service
    pub log_url: String,

    /// Deadline for dialing a single gRPC endpoint
    pub connect_timeout: Duration,

    /// HTTP timeout for log queries
    pub request_timeout: Duration,
}

impl Config {
    /// Creates a configuration with default timeouts
    pub fn new(log_url: String) -> Self {
        Self {
            log_url,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.log_url.is_empty() {
            anyhow::bail!("log_url cannot be empty");
        }

        if !self.log_url.starts_with("http://") && !self.log_url.starts_with("https://") {
            anyhow::bail!("log_url must start with http:// or https://");
        }

        if self.connect_timeout.is_zero() {
            anyhow::bail!("connect_timeout must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }

    /// Builds the log client for this configuration
    pub fn log_client(&self) -> Result<RestLogClient> {
        let http_client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(RestLogClient::with_client(&self.log_url, http_client))
    }

    /// Builds the gRPC connection factory for this configuration
    pub fn connection_factory(&self) -> GrpcConnectionFactory {
        GrpcConnectionFactory::new().with_connect_timeout(self.connect_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:8080".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.log_url = String::new();
        assert!(config.validate().is_err());

        config.log_url = "localhost:8080".to_string();
        assert!(config.validate().is_err());

        config.log_url = "https://logs.cluster.local".to_string();
        assert!(config.validate().is_ok());

        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_client_uses_configured_url() {
        let config = Config::new("http://logs.cluster.local:9000".to_string());
        let client = config.log_client().unwrap();

        assert_eq!(client.base_url(), "http://logs.cluster.local:9000");
        assert!(client.is_ready());
    }
}
