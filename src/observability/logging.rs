//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Pick log level from `RUST_LOG`, falling back to config
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Compact format by default, pretty format for local development

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Default directive when neither `RUST_LOG` nor a usable config level is set.
const DEFAULT_FILTER: &str = "state_gate=info,tower_http=info";

fn build_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(format!(
                "state_gate={level},tower_http={level}",
                level = config.log_level
            ))
        })
        .unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Install the global subscriber. Returns an error if one is already set.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = build_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Compact => registry.with(tracing_subscriber::fmt::layer().compact()).try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).try_init(),
    }
}
