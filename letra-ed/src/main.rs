//! letra-ed - Songwriting and music-video production editor service
//!
//! Hosts the editor HTTP API on a local port. Projects persist to a SQLite
//! snapshot store under the root folder; the meter analyzer and the remote
//! project store are external HTTP services.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use letra_common::config::{
    self, default_config_path, resolve_root_folder, ServiceConfig, DEFAULT_ANALYZER_URL,
};
use letra_common::db;
use letra_ed::services::{CloudSync, MeterClient};
use letra_ed::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "letra-ed", version, about = "Songwriting and production editor service")]
struct Args {
    /// Root folder for the local snapshot store
    #[arg(long)]
    root_folder: Option<String>,

    /// Port to listen on
    #[arg(long, env = "LETRA_PORT", default_value_t = 5180)]
    port: u16,

    /// Meter-analyzer base URL
    #[arg(long, env = "LETRA_ANALYZER_URL")]
    analyzer_url: Option<String>,

    /// Path to the TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately, before any filesystem work
    info!(
        "Starting Letra editor service (letra-ed) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let service_config = match &config_path {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServiceConfig::default(),
    };

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), "LETRA_ROOT", &service_config);
    let db_path = config::database_path(&root_folder)
        .with_context(|| format!("preparing root folder {}", root_folder.display()))?;
    info!("Database path: {}", db_path.display());

    let pool = db::connect(&db_path).await?;
    info!("✓ Connected to local snapshot store");

    let analyzer_url = args
        .analyzer_url
        .as_deref()
        .or(service_config.analyzer_url.as_deref())
        .unwrap_or(DEFAULT_ANALYZER_URL)
        .to_string();
    let meter = MeterClient::new(&analyzer_url).context("building meter-analyzer client")?;
    info!("Meter analyzer: {}", analyzer_url);

    let cloud = CloudSync::new(service_config.cloud.clone())?;
    if cloud.is_authenticated() {
        info!("✓ Cloud sync enabled");
    } else {
        warn!("Cloud sync disabled: no [cloud] section in config");
    }

    let state = AppState::new(pool, meter, cloud);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("letra-ed listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
