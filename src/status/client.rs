//! Remote status client.
//!
//! # Responsibilities
//! - Issue one GET against the configured status endpoint
//! - Bound the call with a timeout
//! - Decode the JSON payload into a typed status
//!
//! # Design Decisions
//! - No retries here; the scheduler retries on its next tick
//! - Anything but HTTP 200 with a decodable body is a `FetchError`
//! - Never touches the store

use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::config::ConfigError;
use crate::status::types::{FetchError, RemoteStatusResponse};

/// Something the scheduler can poll for the current status.
pub trait StatusSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<RemoteStatusResponse, FetchError>> + Send;
}

/// HTTP client for the remote authority.
#[derive(Debug, Clone)]
pub struct RemoteStatusClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl RemoteStatusClient {
    /// Build a client for `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("state-gate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self::with_http_client(endpoint, http))
    }

    /// Use a preconfigured `reqwest::Client` (proxy settings, TLS roots, ...).
    pub fn with_http_client(endpoint: Url, http: reqwest::Client) -> Self {
        Self { endpoint, http }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch and decode the current status.
    pub async fn fetch_status(&self) -> Result<RemoteStatusResponse, FetchError> {
        let response = self.http.get(self.endpoint.clone()).send().await?;

        let code = response.status();
        if code != reqwest::StatusCode::OK {
            return Err(FetchError::UnexpectedStatus(code.as_u16()));
        }

        let body = response.bytes().await?;
        let decoded = RemoteStatusResponse::from_json(&body)?;

        tracing::debug!(
            endpoint = %self.endpoint,
            status = %decoded.status,
            message = decoded.message.as_deref().unwrap_or(""),
            "Status fetched"
        );
        Ok(decoded)
    }
}

impl StatusSource for RemoteStatusClient {
    fn fetch(&self) -> impl Future<Output = Result<RemoteStatusResponse, FetchError>> + Send {
        self.fetch_status()
    }
}
