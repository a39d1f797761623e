mod app;

use std::fs::{self, OpenOptions};

use anyhow::{Context, Result};
use gamestrike_core::{
    config::{self, AppConfig},
    AppContext,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config::ensure_default_config()?;
    let config = AppConfig::load()
        .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;
    init_logging(&config)?;
    info!(api_base = %config.api_base, config = %config_path.display(), "starting GameStrike");

    let ctx = AppContext::new(config).context("failed to build application context")?;
    let mut app = app::GameStrikeApp::new(&ctx);
    let result = app.run().await;
    ctx.shutdown();
    result
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("gamestrike.log");

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;

    // The terminal UI owns stdout, so events only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
