//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Resolve and check the authority endpoint URL
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schedule::parse_schedule;
use crate::config::schema::{AuthorityConfig, GateConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("listener.health_path {0:?} must be a literal path below '/' without captures or wildcards")]
    HealthPath(String),

    #[error("authority endpoint {url:?} is invalid: {reason}")]
    Endpoint { url: String, reason: String },

    #[error("authority.schedule: {0}")]
    Schedule(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("upstream.address {0:?} is not a socket address")]
    UpstreamAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),

    #[error("observability.log_level {0:?} is not a valid filter")]
    LogLevel(String),
}

impl AuthorityConfig {
    /// The absolute URL the client polls: `endpoint` if set, otherwise
    /// `base_url` followed by `status_path`.
    pub fn endpoint_url(&self) -> Result<Url, ValidationError> {
        let raw = match &self.endpoint {
            Some(endpoint) => endpoint.trim().to_string(),
            None => format!(
                "{}/{}",
                self.base_url.trim().trim_end_matches('/'),
                self.status_path.trim().trim_start_matches('/')
            ),
        };

        let url = Url::parse(&raw).map_err(|e| ValidationError::Endpoint {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ValidationError::Endpoint {
                url: raw,
                reason: format!("unsupported scheme {other:?}"),
            }),
        }
    }
}

/// The health route is mounted next to the gated catch-all, so it must be a
/// plain static path: no `{capture}`, no `:`/`*` segments, not `/` itself.
pub fn check_health_path(path: &str) -> Result<(), ValidationError> {
    let literal = path.starts_with('/')
        && path != "/"
        && !path.contains(['{', '}'])
        && !path.split('/').any(|segment| segment.starts_with([':', '*']));

    if literal {
        Ok(())
    } else {
        Err(ValidationError::HealthPath(path.to_string()))
    }
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if let Err(e) = check_health_path(&config.listener.health_path) {
        errors.push(e);
    }

    if let Err(e) = config.authority.endpoint_url() {
        errors.push(e);
    }
    if let Err(e) = parse_schedule(&config.authority.schedule) {
        errors.push(ValidationError::Schedule(e.to_string()));
    }
    if config.authority.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("authority.timeout_secs"));
    }

    if config.upstream.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::UpstreamAddress(config.upstream.address.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(config.observability.metrics_address.clone()));
    }
    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
