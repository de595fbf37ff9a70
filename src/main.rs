//! State gate (v1)
//!
//! Fronts an upstream service and admits requests according to a status
//! flag published by a remote authority.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                    STATE GATE                     │
//!                      │                                                   │
//!   Remote authority   │  ┌────────────┐   ┌───────────┐   ┌───────────┐  │
//!   ◀──── GET ─────────┼──│  status    │──▶│ scheduler │──▶│   store   │  │
//!                      │  │  client    │   │ (refresh) │   │ (ArcSwap) │  │
//!                      │  └────────────┘   └───────────┘   └─────┬─────┘  │
//!                      │                                         │ read   │
//!   Client Request     │  ┌────────────┐   ┌───────────┐   ┌─────▼─────┐  │
//!   ───────────────────┼─▶│   http     │──▶│   gate    │──▶│  policy   │  │
//!                      │  │  server    │   │middleware │   └───────────┘  │
//!                      │  └─────┬──────┘   └─────┬─────┘                  │
//!                      │        │ /health        │ admitted               │
//!                      │        ▼                ▼                        │
//!                      │   always 200      forward to upstream ──────────┼──▶ Upstream
//!                      └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use state_gate::config::{load_config, GateConfig};
use state_gate::http::HttpServer;
use state_gate::lifecycle::{wait_for_signal, Shutdown};
use state_gate::observability::{logging, metrics};
use state_gate::status::{Status, StatusGate};

#[derive(Parser)]
#[command(name = "state-gate")]
#[command(about = "Gate an upstream service on a remotely published status", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    logging::init_tracing(&config.observability)?;

    tracing::info!("state-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        schedule = %config.authority.schedule,
        upstream = %config.upstream.address,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let gate = StatusGate::from_config(&config.authority)?.on_change(Arc::new(|from: Status, to: Status| {
        if to > from {
            tracing::warn!(from = %from, to = %to, "Remote authority tightened access");
        } else {
            tracing::info!(from = %from, to = %to, "Remote authority relaxed access");
        }
    }));

    // Establish a fetched status before accepting traffic.
    gate.start().await?;

    let server = HttpServer::new(config.clone(), gate.store())?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(server.run(listener, server_shutdown));

    wait_for_signal().await;
    shutdown.trigger();

    match server_task.await {
        Ok(result) => result?,
        Err(e) => tracing::error!(error = %e, "HTTP server task failed"),
    }
    gate.stop().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
