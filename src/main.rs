//! backend-metrics - headless metrics pusher
//!
//! Builds the metrics registry and pushes it to the Pushgateway on an interval.
//! Metrics leave the process through outbound pushes only.
//!
//! # Usage
//! ```sh
//! PUSHGATEWAY_URL=http://localhost:9091 cargo run -- --once --job-name nightly-job
//! ```
//!
//! # Environment Variables
//! - `PUSHGATEWAY_URL` - Pushgateway base URL (default: http://pushgateway:9091)
//! - `PUSHGATEWAY_JOB_NAME` - Default job name (default: test-backend)
//! - `PUSHGATEWAY_ENABLED` - Enable periodic pushing (default: true)
//! - `PUSHGATEWAY_INTERVAL_SECS` - Seconds between pushes (default: 15)
//! - `PUSHGATEWAY_TIMEOUT_SECS` - Optional request deadline
//! - `METRICS_APP_LABEL` - Value of the `app` label (default: test-backend)
//! - `METRICS_PROCESS_COLLECTOR` - Collect process metrics (default: true)

use anyhow::Result;
use backend_metrics::config::Config;
use backend_metrics::infrastructure::observability::{Metrics, MetricsReporter, PushgatewayClient};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Push backend metrics to a Prometheus Pushgateway", long_about = None)]
struct Cli {
    /// Job name to push under (overrides PUSHGATEWAY_JOB_NAME)
    #[arg(short, long)]
    job_name: Option<String>,

    /// Pushgateway base URL (overrides PUSHGATEWAY_URL)
    #[arg(long)]
    pushgateway_url: Option<String>,

    /// Push a single snapshot and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();

    info!("backend-metrics {} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env()?;
    if let Some(url) = cli.pushgateway_url {
        config.pushgateway.url = url;
    }
    info!(
        "Configuration loaded: Pushgateway={}, Job={}, App={}",
        config.pushgateway.url,
        cli.job_name.as_deref().unwrap_or(config.pushgateway.job_name.as_str()),
        config.metrics.app_label
    );

    let metrics = Metrics::new(&config.metrics)?;
    let client = PushgatewayClient::new(&config.pushgateway, metrics)?;

    if cli.once {
        // Failures are already logged by the client; a one-shot push still exits cleanly.
        let outcome = client.push_metrics(cli.job_name.as_deref()).await;
        info!("One-shot push finished: {}", outcome);
        return Ok(());
    }

    if !config.observability.enabled {
        warn!("Periodic pushing disabled (PUSHGATEWAY_ENABLED=false). Nothing to do.");
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reporter = MetricsReporter::new(
        Arc::new(client),
        cli.job_name,
        config.observability.push_interval,
    );
    let reporter_handle = tokio::spawn(reporter.run(shutdown_rx));

    info!("Pusher running. Press Ctrl+C to shutdown.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Flushing metrics...");

    let _ = shutdown_tx.send(true);
    let stats = reporter_handle.await?;
    info!(
        "Exiting ({} pushes succeeded, {} failed)",
        stats.pushed, stats.failed
    );

    Ok(())
}
