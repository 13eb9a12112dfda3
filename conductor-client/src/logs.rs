//! Log aggregator client
//!
//! Queries the cluster log forwarder for the logs of a set of pods and
//! decodes its envelope into rendered lines.

use async_trait::async_trait;
use conductor_core::domain::log::LogEntries;
use conductor_core::dto::log::{is_null_body, parse_log_entries};
use reqwest::{Client, Url};

use crate::error::{ClientError, Result};

/// Path of the log query endpoint, without the query expression
pub const LOGS_ENDPOINT: &str = "/v1/log?query=";

/// Separator between pod selectors in a query expression
const QUERY_SEPARATOR: &str = " and ";

/// Builds the request path for a pod set
///
/// Each pod becomes a `pod:<name>` selector and selectors are joined with
/// `" and "`. The expression is not URL-encoded here, so pod names must not
/// contain reserved characters.
pub fn logs_path<S: AsRef<str>>(pods: &[S]) -> String {
    let selectors: Vec<String> = pods
        .iter()
        .map(|pod| format!("pod:{}", pod.as_ref()))
        .collect();

    format!("{}{}", LOGS_ENDPOINT, selectors.join(QUERY_SEPARATOR))
}

/// Source of aggregated pod logs
#[async_trait]
pub trait LogClient: Send + Sync {
    /// Fetches the logs of the given pods
    ///
    /// # Arguments
    /// * `pods` - Pod identifiers, transmitted in order and as given
    ///
    /// # Returns
    /// The rendered log lines, in the order the service reported them
    async fn logs(&self, pods: &[String]) -> Result<LogEntries>;
}

/// HTTP implementation of [`LogClient`]
#[derive(Debug, Clone)]
pub struct RestLogClient {
    /// Base URL as given by the caller
    base_url: String,
    /// `scheme://host:port` of the log service, when the base URL parsed
    origin: Option<String>,
    /// HTTP client instance, absent when the base URL was rejected
    client: Option<Client>,
}

impl RestLogClient {
    /// Create a new log client
    ///
    /// An unparseable base URL is logged and still yields a client; every
    /// call on it then fails with [`ClientError::ClientNull`]. Use
    /// [`RestLogClient::try_new`] to reject it up front.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the log service (e.g., "http://localhost:8080")
    ///
    /// # Example
    /// ```
    /// use conductor_client::RestLogClient;
    ///
    /// let client = RestLogClient::new("http://localhost:8080");
    /// assert!(client.is_ready());
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new log client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, etc.
    ///
    /// # Example
    /// ```
    /// use conductor_client::RestLogClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = RestLogClient::with_client("http://localhost:8080", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        tracing::debug!("Create log client pointing at {}", base_url);

        match parse_origin(&base_url) {
            Ok(origin) => Self {
                base_url,
                origin: Some(origin),
                client: Some(client),
            },
            Err(err) => {
                tracing::warn!("{}", err);
                Self {
                    base_url,
                    origin: None,
                    client: None,
                }
            }
        }
    }

    /// Create a new log client, failing on an invalid base URL
    pub fn try_new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        parse_origin(&base_url)?;
        Ok(Self::new(base_url))
    }

    /// Get the base URL the client was built with
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the client has a usable transport
    pub fn is_ready(&self) -> bool {
        self.client.is_some() && self.origin.is_some()
    }
}

#[async_trait]
impl LogClient for RestLogClient {
    async fn logs(&self, pods: &[String]) -> Result<LogEntries> {
        tracing::debug!("Called get logs: {:?}", pods);

        let (Some(client), Some(origin)) = (&self.client, &self.origin) else {
            tracing::error!("Impossible to get logs. The client is null.");
            return Err(ClientError::ClientNull);
        };

        let url = format!("{}{}", origin, logs_path(pods));
        tracing::debug!("Send request to logger service: {}", url);

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::Aggregation)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Log service answered {}: {}", status, error_text);
            return Err(ClientError::aggregation_status(status.as_u16(), error_text));
        }

        let body = response.text().await.map_err(ClientError::Aggregation)?;

        if is_null_body(&body) {
            tracing::debug!("Log service reported no entries");
            return Ok(LogEntries::empty());
        }

        let entries = parse_log_entries(&body)?;
        tracing::debug!("Received {} log entries", entries.len());

        Ok(entries)
    }
}

/// [`LogClient`] returning a fixed list for every call
///
/// The pod set is ignored. Useful wherever a log source is needed without a
/// network.
#[derive(Debug, Clone, Default)]
pub struct MockLogClient {
    logs: Vec<String>,
}

impl MockLogClient {
    pub fn new(logs: Vec<String>) -> Self {
        Self { logs }
    }
}

#[async_trait]
impl LogClient for MockLogClient {
    async fn logs(&self, _pods: &[String]) -> Result<LogEntries> {
        Ok(LogEntries::new(self.logs.clone()))
    }
}

/// Extracts `scheme://host:port` from a base URL
fn parse_origin(base_url: &str) -> Result<String> {
    let invalid = |reason: String| ClientError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };

    let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(url.origin().ascii_serialization())
}
