//! Symptom Checker - Main Entry Point

use anyhow::Context;
use api::{init_logging, init_metrics, run_server, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load().context("loading configuration")?;
    init_logging(&config)?;

    info!("=== Symptom Checker v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Educational rule-based diagnosis demo; not for clinical use");

    let metrics = init_metrics(&config)?;
    run_server(&config, metrics).await?;

    Ok(())
}
