//! Sensimity fetch
//!
//! Single-binary client that:
//! 1. Loads configuration and resolves the client secret and password
//! 2. Opens the persisted credential file
//! 3. Issues one authenticated GET against the Sensimity API
//! 4. Prints the status line and response body

mod config;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use sensimity_auth::FileStore;
use sensimity_client::SensimityClient;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Fetch one resource from the Sensimity API with a managed OAuth credential
#[derive(Parser, Debug)]
#[command(name = "sensimity-fetch", version)]
struct Args {
    /// Config file (falls back to SENSIMITY_CONFIG, then ./sensimity.toml)
    #[arg(long)]
    config: Option<String>,

    /// Print token endpoint counters in Prometheus text format to stderr
    #[arg(long)]
    metrics: bool,

    /// API path to GET
    #[arg(default_value = "/networks")]
    resource: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let prometheus = if args.metrics {
        Some(metrics::install_recorder()?)
    } else {
        None
    };

    let config_path = Config::resolve_path(args.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        base_url = %config.api.base_url,
        username = %config.client.username,
        storage = %config.storage.path.display(),
        max_attempts = config.retry.max_attempts,
        "configuration loaded"
    );

    let store = FileStore::open(config.storage.path.clone())
        .await
        .with_context(|| {
            format!(
                "failed to open credential file {}",
                config.storage.path.display()
            )
        })?;

    let client = SensimityClient::new(config.client_settings()?, Arc::new(store))
        .context("failed to build sensimity client")?;

    let response = client
        .get(&args.resource)
        .await
        .with_context(|| format!("request for {} failed", args.resource))?;

    let status = response.status();
    let body = response.text().await.context("failed to read response body")?;

    println!("{status}");
    println!("{body}");

    if let Some(handle) = prometheus {
        eprint!("{}", handle.render());
    }

    if !status.is_success() {
        warn!(
            status = status.as_u16(),
            resource = %args.resource,
            "API returned an error status"
        );
        anyhow::bail!("API returned {status}");
    }
    Ok(())
}
