use axum::http::Method;
use clap::{Parser, Subcommand};
use std::time::Duration;
use url::Url;

use state_gate::http::HealthReport;
use state_gate::status::{is_allowed, RemoteStatusClient};

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Operator CLI for the state gate", long_about = None)]
struct Cli {
    /// Base URL of a running gateway.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Health route path on the gateway.
    #[arg(long, default_value = "/health")]
    health_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the gateway's current status
    Status,
    /// Tell whether a request with METHOD would be admitted right now
    Check {
        method: String,
    },
    /// Fetch the status straight from an authority endpoint
    Probe {
        endpoint: String,
        #[arg(short, long, default_value_t = 10)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let report = fetch_health(&cli.url, &cli.health_path).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Check { method } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let report = fetch_health(&cli.url, &cli.health_path).await?;
            let verdict = if is_allowed(report.state, &method) { "allowed" } else { "denied" };
            println!("{} {} under {}", method, verdict, report.state);
        }
        Commands::Probe { endpoint, timeout_secs } => {
            let client = RemoteStatusClient::new(Url::parse(&endpoint)?, Duration::from_secs(timeout_secs))?;
            match client.fetch_status().await {
                Ok(resp) => {
                    println!("status:  {}", resp.status);
                    if let Some(message) = resp.message {
                        println!("message: {}", message);
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    eprintln!("The gateway would fail closed to HARD_LOCK");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

async fn fetch_health(base: &str, path: &str) -> Result<HealthReport, Box<dyn std::error::Error>> {
    let res = reqwest::get(format!("{}{}", base.trim_end_matches('/'), path)).await?;
    let status = res.status();
    if !status.is_success() {
        return Err(format!("gateway health route returned status {}", status).into());
    }
    Ok(res.json().await?)
}
