use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use corkboard::api::{self, AppState};
use corkboard::config::ServerConfig;
use corkboard::db;

#[derive(Parser)]
#[command(name = "corkboardd", about = "Kanban board server", version)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config).
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database file (overrides config).
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(db_path) = cli.db {
        config.db_path = db_path;
    }

    let pool = db::connection::create_pool(&config.db_path)
        .await
        .context("opening database")?;
    db::connection::run_migrations(&pool)
        .await
        .context("applying schema")?;

    let purged = db::auth_tokens::delete_expired(&pool)
        .await
        .context("purging expired tokens")?;
    if purged > 0 {
        tracing::info!(purged, "removed expired auth tokens");
    }

    tokio::fs::create_dir_all(&config.blob_dir)
        .await
        .context("creating blob directory")?;

    let state = AppState {
        pool,
        blob_dir: config.blob_dir.clone(),
    };
    let app = api::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, db = %config.db_path.display(), "corkboardd listening");

    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
