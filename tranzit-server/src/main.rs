use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tranzit_core::Time;
use tranzit_server::{AppState, ServerConfig, create_router};

/// Journey planner HTTP server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8080
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,

    /// OSM .pbf extract
    #[arg(long)]
    osm: Option<PathBuf>,

    /// GTFS feed directory, may be repeated
    #[arg(long = "gtfs")]
    gtfs_dirs: Vec<PathBuf>,

    /// Service day, YYYY-MM-DD
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    max_transfer_time: Option<Time>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(osm) = self.osm {
            config.osm_path = Some(osm);
        }
        if !self.gtfs_dirs.is_empty() {
            config.gtfs_dirs = self.gtfs_dirs;
        }
        if self.date.is_some() {
            config.date = self.date;
        }
        if let Some(max_transfer_time) = self.max_transfer_time {
            config.max_transfer_time = max_transfer_time;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config()?;
    let model_config = config.model_config()?;

    tracing::info!(
        osm = %model_config.osm_path.display(),
        feeds = model_config.gtfs_dirs.len(),
        "Building transit model"
    );
    let model =
        tokio::task::spawn_blocking(move || tranzit_core::create_transit_model(&model_config))
            .await??;
    tracing::info!("{model}");

    let app = create_router(AppState::new(model, config.concurrency_limit), &config);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("Listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    tracing::info!("Shutting down");
}
