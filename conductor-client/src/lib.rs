//! Conductor Client
//!
//! Networking substrate shared by every conductor command:
//!
//! - [`ConnectionRegistry`]: one long-lived gRPC channel per endpoint
//!   address, safe to share between tasks.
//! - [`LogClient`]: queries the cluster log forwarder and decodes its
//!   envelope into rendered log lines, with an HTTP ([`RestLogClient`]) and a
//!   fixed ([`MockLogClient`]) implementation.
//!
//! # Example
//!
//! ```no_run
//! use conductor_client::{GrpcConnectionFactory, GrpcRegistry, LogClient, RestLogClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = GrpcRegistry::new(GrpcConnectionFactory::new());
//!     let _channel = registry.add("10.0.0.5:50051").await?;
//!
//!     let logs = RestLogClient::new("http://localhost:8080");
//!     for line in logs.logs(&["web-1".to_string()]).await? {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```

pub mod connections;
pub mod error;
pub mod logs;

// Re-export commonly used types
pub use connections::{
    Connection, ConnectionFactory, ConnectionRegistry, GrpcConnectionFactory, GrpcRegistry,
};
pub use error::{BoxError, ClientError, RegistryError, RegistryResult, Result};
pub use logs::{LogClient, MockLogClient, RestLogClient, logs_path};
