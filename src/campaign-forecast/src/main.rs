//! Campaign Forecast — budget-driven estimates of campaign reach, clicks and results.
//!
//! Main entry point: loads configuration, aggregates the historical dataset once,
//! then either serves the HTTP API or prints the analysis report.

use anyhow::Context;
use campaign_api::ApiServer;
use campaign_core::config::{AppConfig, FallbackPolicy};
use campaign_estimation::SnapshotStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "campaign-forecast")]
#[command(about = "Estimate campaign performance from historical per-objective baselines")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "CAMPAIGN_FORECAST_CONFIG")]
    config: Option<PathBuf>,

    /// Historical dataset, CSV or spreadsheet (overrides config)
    #[arg(long, env = "CAMPAIGN_FORECAST__DATASET__PATH")]
    dataset: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "CAMPAIGN_FORECAST__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Policy for objectives without a baseline: zero | overall (overrides config)
    #[arg(long)]
    unknown_objective: Option<FallbackPolicy>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, Default)]
enum Command {
    /// Aggregate the dataset and serve the HTTP API
    #[default]
    Serve,
    /// Aggregate the dataset and print the baseline report as JSON
    Analyze,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campaign_forecast=info,campaign_api=info,campaign_estimation=info,campaign_ingest=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => {
            return Err(e).context("failed to load configuration file");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }
    };

    // Apply CLI overrides
    if let Some(dataset) = cli.dataset {
        config.dataset.path = dataset;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(policy) = cli.unknown_objective {
        config.forecast.unknown_objective = policy;
    }

    info!(
        node_id = %config.node_id,
        dataset = %config.dataset.path,
        http_port = config.api.http_port,
        mode = ?config.forecast.mode,
        unknown_objective = ?config.forecast.unknown_objective,
        "Configuration loaded"
    );

    // Aggregation happens once, before any request is served.
    let snapshot_config = config.clone();
    let snapshot = tokio::task::spawn_blocking(move || campaign_ingest::build_snapshot(&snapshot_config))
        .await?
        .map_err(|e| {
            error!(error = %e, "Historical data unavailable");
            e
        })
        .context("failed to build baseline snapshot")?;

    match cli.command.unwrap_or_default() {
        Command::Analyze => {
            let report = serde_json::to_string_pretty(&snapshot.report())?;
            println!("{report}");
            Ok(())
        }
        Command::Serve => {
            let snapshots = Arc::new(SnapshotStore::new(snapshot));
            let api_server = ApiServer::new(config.clone(), snapshots);

            if config.metrics.enabled {
                if let Err(e) = api_server.start_metrics().await {
                    error!(error = %e, "Failed to start metrics exporter");
                }
            }

            info!("Campaign Forecast is ready to serve traffic");

            // Start HTTP server (blocks until shutdown)
            api_server.start_http().await
        }
    }
}
