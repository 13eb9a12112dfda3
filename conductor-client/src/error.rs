//! Error types for the conductor client

use conductor_core::dto::log::EnvelopeError;
use thiserror::Error;

/// Boxed error produced by connection factories and channel close
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for log client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Result type alias for connection registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur when querying the log aggregator
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client has no usable HTTP transport
    #[error("impossible to get logs: the client is null")]
    ClientNull,

    /// The base URL could not be parsed
    #[error("invalid base URL [{url}]: {reason}")]
    InvalidUrl {
        /// URL as given by the caller
        url: String,
        /// Parser message
        reason: String,
    },

    /// HTTP exchange failed before a response was received
    #[error("error aggregating logs: {0}")]
    Aggregation(#[source] reqwest::Error),

    /// Log service answered with a non-success status
    #[error("error aggregating logs (status {status}): {message}")]
    AggregationStatus {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Response body is not a valid envelope
    #[error(transparent)]
    Unmarshal(#[from] EnvelopeError),
}

impl ClientError {
    /// Create an aggregation error from a status code and message
    pub fn aggregation_status(status: u16, message: impl Into<String>) -> Self {
        Self::AggregationStatus {
            status,
            message: message.into(),
        }
    }

    /// Check if the HTTP exchange with the log service failed
    pub fn is_aggregation_error(&self) -> bool {
        matches!(self, Self::Aggregation(_) | Self::AggregationStatus { .. })
    }

    /// Check if the response body could not be decoded
    pub fn is_unmarshal_error(&self) -> bool {
        matches!(self, Self::Unmarshal(_))
    }

    /// Check if the client was used without a transport
    pub fn is_client_null(&self) -> bool {
        matches!(self, Self::ClientNull)
    }
}

/// Errors reported by the connection registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Add was called with an empty address
    #[error("connection address cannot be empty")]
    InvalidAddress,

    /// A connection for the address is already registered
    #[error("connection already exists: {0}")]
    AlreadyExists(String),

    /// No connection is registered for the address
    #[error("connection was not found: {0}")]
    NotFound(String),

    /// The factory succeeded but produced no connection
    #[error("factory generated no connection for {0}")]
    FactoryNull(String),

    /// The factory failed; its error is reported as is
    #[error("{source}")]
    Factory {
        address: String,
        #[source]
        source: BoxError,
    },

    /// Closing the connection failed; the entry was removed regardless
    #[error("failed to close connection {address}: {source}")]
    Close {
        address: String,
        #[source]
        source: BoxError,
    },
}

impl RegistryError {
    /// Address the error refers to, if any
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::InvalidAddress => None,
            Self::AlreadyExists(address)
            | Self::NotFound(address)
            | Self::FactoryNull(address)
            | Self::Factory { address, .. }
            | Self::Close { address, .. } => Some(address),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error is an "already exists" error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}
