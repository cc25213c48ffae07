use anyhow::Context;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use parkpulse_collector::Collector;
use parkpulse_core::{AppConfig, ConfigLoader};
use parkpulse_heatmap::HeatmapCache;
use parkpulse_store::{ObservationStore, PgObservationStore};
use parkpulse_web_api::{ApiServer, AppState};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "parkpulse")]
#[command(about = "Parking lot occupancy tracker and weekly heatmap server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web API server
    Serve {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Run one collection pass over the configured lot pages
    Collect {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Serve { config } => {
            run_serve(&config).await?;
        }
        Commands::Collect { config } => {
            run_collect(&config).await?;
        }
    }

    Ok(())
}

fn target_zone(config: &AppConfig) -> anyhow::Result<Tz> {
    config
        .heatmap
        .timezone
        .parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("invalid timezone {:?}: {}", config.heatmap.timezone, e))
}

async fn run_serve(config_path: &str) -> anyhow::Result<()> {
    tracing::info!("Starting parkpulse server with config: {}", config_path);

    let config = ConfigLoader::load_from(config_path)?;
    let zone = target_zone(&config)?;

    let store: Arc<dyn ObservationStore> = Arc::new(
        PgObservationStore::connect(&config.store)
            .await
            .context("connecting to the observation store")?,
    );

    let cache = Arc::new(HeatmapCache::new(
        store.clone(),
        zone,
        Duration::from_secs(config.heatmap.cache_freshness_secs),
    ));

    let collector = Arc::new(Collector::new(store.clone(), &config.collector)?);

    if config.collector.secret.is_empty() {
        tracing::warn!("collector secret is empty, the trigger endpoint accepts no requests");
    }

    let state = Arc::new(AppState {
        cache,
        store,
        collector,
        trigger_secret: config.collector.secret.clone(),
    });

    let server = ApiServer::new(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(
        "Serving heatmap in zone {} with {}s cache freshness",
        config.heatmap.timezone,
        config.heatmap.cache_freshness_secs
    );

    // Spawn server in background task
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve(&addr).await {
            tracing::error!("Server error: {}", e);
        }
    });

    // Wait for shutdown signal (SIGINT or SIGTERM)
    let shutdown_signal = async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to create SIGTERM handler");

        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to create SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, shutting down");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT (Ctrl+C), shutting down");
            }
        }
    };

    shutdown_signal.await;

    server_handle.abort();
    tracing::info!("parkpulse server stopped");

    Ok(())
}

async fn run_collect(config_path: &str) -> anyhow::Result<()> {
    let config = ConfigLoader::load_from(config_path)?;

    if config.collector.target_urls.is_empty() {
        anyhow::bail!("no collector target_urls configured");
    }

    let store: Arc<dyn ObservationStore> = Arc::new(
        PgObservationStore::connect(&config.store)
            .await
            .context("connecting to the observation store")?,
    );

    let collector = Collector::new(store, &config.collector)?;

    let stored = collector.run_once().await;
    tracing::info!(
        "Collection pass finished: {}/{} target(s) stored",
        stored,
        config.collector.target_urls.len()
    );

    Ok(())
}
