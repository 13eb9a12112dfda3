//! tonic-backed connections
//!
//! Channels are dialed without TLS. Dropping the last clone of a tonic
//! channel tears down its connection, so closing the registry's handle never
//! fails.

use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

use super::{Connection, ConnectionFactory, ConnectionRegistry};
use crate::error::BoxError;

/// Registry of tonic channels
pub type GrpcRegistry = ConnectionRegistry<Channel>;

#[async_trait]
impl Connection for Channel {
    async fn close(self) -> Result<(), BoxError> {
        drop(self);
        Ok(())
    }
}

/// Factory dialing `host:port` addresses over plaintext HTTP/2
#[derive(Debug, Clone, Default)]
pub struct GrpcConnectionFactory {
    connect_timeout: Option<Duration>,
    lazy: bool,
}

impl GrpcConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds how long a single dial may take
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Defers dialing to the first RPC instead of doing it in the factory
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Builds the tonic endpoint for a registry address
    ///
    /// Addresses without a scheme are dialed as `http://<address>`.
    pub fn endpoint(&self, address: &str) -> Result<Endpoint, BoxError> {
        let uri = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{}", address)
        };

        let mut endpoint = Endpoint::from_shared(uri)?;
        if let Some(timeout) = self.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }

        Ok(endpoint)
    }
}

#[async_trait]
impl ConnectionFactory<Channel> for GrpcConnectionFactory {
    async fn connect(&self, address: &str) -> Result<Option<Channel>, BoxError> {
        let endpoint = self.endpoint(address)?;

        if self.lazy {
            return Ok(Some(endpoint.connect_lazy()));
        }

        tracing::debug!("Dialing {}", endpoint.uri());
        let channel = endpoint.connect().await?;

        Ok(Some(channel))
    }
}
