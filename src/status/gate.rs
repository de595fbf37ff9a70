//! One-call setup of client, store and scheduler from configuration.

use axum::http::Method;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{parse_schedule, AuthorityConfig, ConfigError, ValidationError};
use crate::status::client::RemoteStatusClient;
use crate::status::policy::is_allowed;
use crate::status::scheduler::{ChangeCallback, RefreshScheduler, SchedulerError};
use crate::status::store::StatusStore;
use crate::status::types::Status;

/// A configured status gate: remote client, shared store and refresh scheduler.
pub struct StatusGate {
    store: Arc<StatusStore>,
    scheduler: RefreshScheduler<RemoteStatusClient>,
}

impl StatusGate {
    /// Validate `config` and wire up the components. Nothing runs until `start`.
    pub fn from_config(config: &AuthorityConfig) -> Result<Self, ConfigError> {
        let endpoint = config.endpoint_url()?;
        let timeout = Self::fetch_timeout(config)?;
        let client = RemoteStatusClient::new(endpoint, timeout)?;
        Self::with_client(config, client)
    }

    /// Like `from_config`, but with a caller-built client.
    pub fn with_client(config: &AuthorityConfig, client: RemoteStatusClient) -> Result<Self, ConfigError> {
        let schedule = parse_schedule(&config.schedule)?;
        let timeout = Self::fetch_timeout(config)?;
        let store = Arc::new(StatusStore::new(config.initial_status));

        tracing::info!(
            endpoint = %client.endpoint(),
            schedule = %schedule,
            timeout = ?timeout,
            initial_status = %config.initial_status,
            "Status gate configured"
        );

        let scheduler = RefreshScheduler::new(Arc::new(client), store.clone(), schedule)?
            .with_fetch_timeout(timeout);

        Ok(Self { store, scheduler })
    }

    fn fetch_timeout(config: &AuthorityConfig) -> Result<Duration, ConfigError> {
        if config.timeout_secs == 0 {
            return Err(ValidationError::ZeroTimeout("authority.timeout_secs").into());
        }
        Ok(Duration::from_secs(config.timeout_secs))
    }

    /// Register a status-change callback. Must be called before `start`.
    pub fn on_change(mut self, callback: ChangeCallback) -> Self {
        self.scheduler = self.scheduler.on_change(callback);
        self
    }

    /// Fetch once, then keep refreshing in the background.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        self.scheduler.start().await?;
        tracing::info!(status = %self.store.read(), "Status gate initialized");
        Ok(())
    }

    /// Stop refreshing. Idempotent.
    pub async fn stop(&self) {
        self.scheduler.stop().await;
    }

    pub async fn is_running(&self) -> bool {
        self.scheduler.is_running().await
    }

    /// Shared store for the middleware and health route.
    pub fn store(&self) -> Arc<StatusStore> {
        self.store.clone()
    }

    pub fn current_status(&self) -> Status {
        self.store.read()
    }

    /// Whether a request with `method` would be admitted right now.
    pub fn is_allowed(&self, method: &Method) -> bool {
        is_allowed(self.store.read(), method)
    }
}
