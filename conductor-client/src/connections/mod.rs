//! Connection registry
//!
//! Keeps at most one open RPC channel per endpoint address. Channels are
//! produced on demand by a caller-supplied [`ConnectionFactory`] and closed
//! when removed.
//!
//! Add and Remove hold the registry lock exclusively for their whole critical
//! section, including the factory call and the channel close, so two channels
//! are never opened for the same address. Get and Snapshot only take it
//! shared.

mod grpc;

pub use grpc::{GrpcConnectionFactory, GrpcRegistry};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{BoxError, RegistryError, RegistryResult};

/// An open, closable RPC channel
///
/// Handles are cheap clones of one underlying channel. The registry keeps one
/// clone and hands others to callers.
#[async_trait]
pub trait Connection: Clone + Send + Sync + 'static {
    /// Closes the channel and reports the outcome
    async fn close(self) -> Result<(), BoxError>;
}

/// Producer of connections from addresses
#[async_trait]
pub trait ConnectionFactory<C: Connection>: Send + Sync {
    /// Opens a connection to `address`
    ///
    /// `Ok(None)` means the factory succeeded without producing a channel,
    /// which the registry reports as [`RegistryError::FactoryNull`].
    async fn connect(&self, address: &str) -> Result<Option<C>, BoxError>;
}

/// Thread-safe map of address to open connection
pub struct ConnectionRegistry<C: Connection> {
    connections: RwLock<HashMap<String, C>>,
    factory: Arc<dyn ConnectionFactory<C>>,
}

impl<C: Connection> ConnectionRegistry<C> {
    /// Creates an empty registry backed by `factory`
    pub fn new(factory: impl ConnectionFactory<C> + 'static) -> Self {
        Self::with_factory(Arc::new(factory))
    }

    /// Creates an empty registry sharing an existing factory
    pub fn with_factory(factory: Arc<dyn ConnectionFactory<C>>) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            factory,
        }
    }

    /// Opens and registers a connection for `address`
    ///
    /// Fails without calling the factory when the address is already
    /// registered. Factory errors are returned as is and leave the registry
    /// untouched.
    ///
    /// The factory must not call back into this registry.
    pub async fn add(&self, address: &str) -> RegistryResult<C> {
        if address.is_empty() {
            tracing::error!("Refusing to add a connection with an empty address");
            return Err(RegistryError::InvalidAddress);
        }

        let mut connections = self.connections.write().await;
        tracing::debug!(address, "add new connection");

        if connections.contains_key(address) {
            tracing::error!(address, "connection already existed");
            return Err(RegistryError::AlreadyExists(address.to_string()));
        }

        let conn = match self.factory.connect(address).await {
            Ok(Some(conn)) => conn,
            Ok(None) => {
                tracing::error!(address, "factory generated no connection");
                return Err(RegistryError::FactoryNull(address.to_string()));
            }
            Err(source) => {
                tracing::error!(address, error = %source, "factory failed");
                return Err(RegistryError::Factory {
                    address: address.to_string(),
                    source,
                });
            }
        };

        connections.insert(address.to_string(), conn.clone());
        tracing::debug!(address, "connection successfully added");

        Ok(conn)
    }

    /// Returns the connection registered for `address`
    pub async fn get(&self, address: &str) -> RegistryResult<C> {
        tracing::debug!(address, "requested connection to map");

        let connections = self.connections.read().await;
        match connections.get(address) {
            Some(conn) => Ok(conn.clone()),
            None => {
                tracing::debug!(address, "requested connection was not found");
                Err(RegistryError::NotFound(address.to_string()))
            }
        }
    }

    /// Closes and unregisters the connection for `address`
    ///
    /// The entry is removed whatever the close outcome; a close failure is
    /// still reported as [`RegistryError::Close`].
    pub async fn remove(&self, address: &str) -> RegistryResult<()> {
        let mut connections = self.connections.write().await;
        tracing::debug!(address, "requested to be removed");

        let Some(conn) = connections.remove(address) else {
            tracing::debug!(address, "connection to remove was not found");
            return Err(RegistryError::NotFound(address.to_string()));
        };

        if let Err(source) = conn.close().await {
            tracing::error!(address, error = %source, "failed to close connection");
            return Err(RegistryError::Close {
                address: address.to_string(),
                source,
            });
        }

        tracing::debug!(address, "successfully removed connection");
        Ok(())
    }

    /// Point-in-time list of the registered connections
    ///
    /// Order is unspecified. A returned handle may be closed by a concurrent
    /// [`remove`](Self::remove) at any time.
    pub async fn snapshot(&self) -> Vec<C> {
        self.connections.read().await.values().cloned().collect()
    }

    /// Addresses currently registered, in unspecified order
    pub async fn addresses(&self) -> Vec<String> {
        self.connections.read().await.keys().cloned().collect()
    }

    pub async fn contains(&self, address: &str) -> bool {
        self.connections.read().await.contains_key(address)
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Connection identified by the factory call that produced it
    #[derive(Debug, Clone)]
    struct FakeConnection {
        id: usize,
        closed: Arc<AtomicBool>,
        fail_close: bool,
    }

    #[async_trait]
    impl Connection for FakeConnection {
        async fn close(self) -> Result<(), BoxError> {
            self.closed.store(true, Ordering::SeqCst);
            if self.fail_close {
                return Err("transport is closing".into());
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        Ok,
        Fail,
        Null,
        FailClose,
    }

    #[derive(Clone)]
    struct FakeFactory {
        calls: Arc<AtomicUsize>,
        mode: Mode,
        delay: Option<Duration>,
    }

    impl FakeFactory {
        fn new(mode: Mode) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                mode,
                delay: None,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConnectionFactory<FakeConnection> for FakeFactory {
        async fn connect(&self, address: &str) -> Result<Option<FakeConnection>, BoxError> {
            let id = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            match self.mode {
                Mode::Fail => Err(format!("dial {}: connection refused", address).into()),
                Mode::Null => Ok(None),
                Mode::Ok | Mode::FailClose => Ok(Some(FakeConnection {
                    id,
                    closed: Arc::new(AtomicBool::new(false)),
                    fail_close: self.mode == Mode::FailClose,
                })),
            }
        }
    }

    fn registry(factory: &FakeFactory) -> ConnectionRegistry<FakeConnection> {
        ConnectionRegistry::new(factory.clone())
    }

    #[tokio::test]
    async fn test_add_then_get_returns_same_connection() {
        let factory = FakeFactory::new(Mode::Ok);
        let registry = registry(&factory);

        let added = registry.add("svc:1").await.unwrap();
        let got = registry.get("svc:1").await.unwrap();

        assert_eq!(added.id, 1);
        assert_eq!(got.id, added.id);
    }

    #[tokio::test]
    async fn test_add_twice_fails_without_second_factory_call() {
        let factory = FakeFactory::new(Mode::Ok);
        let registry = registry(&factory);

        registry.add("svc:1").await.unwrap();
        let err = registry.add("svc:1").await.unwrap_err();

        assert!(err.is_already_exists());
        assert_eq!(factory.calls(), 1);
        assert_eq!(registry.get("svc:1").await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_remove_then_add_opens_a_new_connection() {
        let factory = FakeFactory::new(Mode::Ok);
        let registry = registry(&factory);

        let first = registry.add("a").await.unwrap();
        registry.remove("a").await.unwrap();
        let second = registry.add("a").await.unwrap();

        assert_eq!(factory.calls(), 2);
        assert_ne!(first.id, second.id);
        assert!(first.closed.load(Ordering::SeqCst));
        assert!(!second.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_remove_twice_reports_not_found() {
        let factory = FakeFactory::new(Mode::Ok);
        let registry = registry(&factory);

        registry.add("a").await.unwrap();
        assert!(registry.remove("a").await.is_ok());

        let err = registry.remove("a").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_close_failure_still_removes_entry() {
        let factory = FakeFactory::new(Mode::FailClose);
        let registry = registry(&factory);

        let conn = registry.add("a").await.unwrap();
        let err = registry.remove("a").await.unwrap_err();

        assert!(matches!(err, RegistryError::Close { ref address, .. } if address == "a"));
        assert!(conn.closed.load(Ordering::SeqCst));
        assert!(registry.get("a").await.unwrap_err().is_not_found());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_snapshot_lists_current_connections() {
        let factory = FakeFactory::new(Mode::Ok);
        let registry = registry(&factory);

        registry.add("a").await.unwrap();
        registry.add("b").await.unwrap();

        let ids: HashSet<usize> = registry.snapshot().await.iter().map(|c| c.id).collect();
        assert_eq!(ids, HashSet::from([1, 2]));

        let addresses: HashSet<String> = registry.addresses().await.into_iter().collect();
        assert_eq!(
            addresses,
            HashSet::from(["a".to_string(), "b".to_string()])
        );

        registry.remove("a").await.unwrap();

        let ids: HashSet<usize> = registry.snapshot().await.iter().map(|c| c.id).collect();
        assert_eq!(ids, HashSet::from([2]));
        assert_eq!(registry.addresses().await, vec!["b".to_string()]);
        assert_eq!(factory.calls(), 2);
    }

    #[tokio::test]
    async fn test_factory_null_leaves_registry_empty() {
        let factory = FakeFactory::new(Mode::Null);
        let registry = registry(&factory);

        let err = registry.add("x").await.unwrap_err();
        assert!(matches!(err, RegistryError::FactoryNull(ref address) if address == "x"));
        assert!(registry.get("x").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_factory_error_is_propagated() {
        let factory = FakeFactory::new(Mode::Fail);
        let registry = registry(&factory);

        let err = registry.add("x:9").await.unwrap_err();
        assert_eq!(err.to_string(), "dial x:9: connection refused");
        assert!(!registry.contains("x:9").await);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_empty_address_is_rejected() {
        let factory = FakeFactory::new(Mode::Ok);
        let registry = registry(&factory);

        let err = registry.add("").await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidAddress));
        assert_eq!(factory.calls(), 0);
    }

    #[tokio::test]
    async fn test_addresses_are_byte_exact() {
        let factory = FakeFactory::new(Mode::Ok);
        let registry = registry(&factory);

        registry.add("host:80").await.unwrap();
        registry.add("host:80/").await.unwrap();

        assert_eq!(registry.len().await, 2);
        assert_eq!(factory.calls(), 2);

        assert!(registry.get("HOST:80").await.unwrap_err().is_not_found());
        assert!(registry.get("host:8080").await.unwrap_err().is_not_found());
        assert_eq!(factory.calls(), 2);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_open_one_connection() {
        let mut factory = FakeFactory::new(Mode::Ok);
        factory.delay = Some(Duration::from_millis(20));
        let registry = Arc::new(registry(&factory));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move { registry.add("svc:1").await }));
        }

        let mut successes = 0;
        let mut already_exists = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(err) if err.is_already_exists() => already_exists += 1,
                Err(err) => panic!("unexpected error: {err}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(already_exists, 15);
        assert_eq!(factory.calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_interleaved_operations_keep_latest_connection() {
        let factory = FakeFactory::new(Mode::Ok);
        let registry = Arc::new(registry(&factory));

        let mut handles = Vec::new();
        for worker in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let address = format!("svc:{}", worker % 2);
                for _ in 0..25 {
                    let _ = registry.add(&address).await;
                    let _ = registry.get(&address).await;
                    let _ = registry.remove(&address).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Every add is followed by a remove from the same worker
        for address in ["svc:0", "svc:1"] {
            assert!(registry.get(address).await.unwrap_err().is_not_found());
        }
        assert!(registry.is_empty().await);

        let last = registry.add("svc:final").await.unwrap();
        assert_eq!(registry.get("svc:final").await.unwrap().id, last.id);
    }
}
