//! Symptom Lens API Server
//!
//! Run with: cargo run --bin symptom-lens-api [-- --config path/to/config.toml]
//!
//! # Configuration
//!
//! Settings come from the config file (see `symptom-lens config`), then
//! environment overrides:
//! - `SYMPTOM_LENS_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `SYMPTOM_LENS_API_PORT`: Port to listen on (default: 8090)
//! - `SYMPTOM_LENS_WINDOW_DAYS`: Default analysis window (default: 30)
//! - `SYMPTOM_LENS_NARRATIVE_ENABLED`: Enable the narrative service (default: false)
//! - `SYMPTOM_LENS_NARRATIVE_ENDPOINT`: Narrative service URL
//! - `SYMPTOM_LENS_NARRATIVE_API_KEY`: Narrative service key
//! - `RUST_LOG`: Log filter (overrides `[logging] level`)

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use symptom_lens::api::{serve, AppState};
use symptom_lens::config::Config;

#[derive(Parser)]
#[command(name = "symptom-lens-api")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Symptom Lens HTTP API")]
struct Args {
    /// Config file (default: standard locations, then environment)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::load_default(),
    };

    symptom_lens::logging::init(&config.logging);

    tracing::info!("Starting Symptom Lens API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        window_days = config.analysis.window_days,
        day_policy = %config.analysis.day_policy,
        "Analysis defaults"
    );

    if config.narrative.enabled {
        tracing::info!("Narrative generation enabled: {}", config.narrative.endpoint);
    } else {
        tracing::info!("Narrative generation disabled (set SYMPTOM_LENS_NARRATIVE_ENABLED to enable)");
    }

    let state = AppState::from_config(config).context("Failed to build narrative client")?;

    serve(state).await.context("API server failed")?;

    tracing::info!("Symptom Lens API server stopped");
    Ok(())
}
