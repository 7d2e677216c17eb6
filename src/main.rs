use anyhow::Result;
use cvmscraper::{config::Config, pipeline};
use reqwest::Client;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Usage: `cvmscraper [config.yaml]`
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let cfg = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Config::from_yaml_file(&path)?,
        None => Config::default().validated()?,
    };
    info!(?cfg, "configured");

    // ─── 3) run ──────────────────────────────────────────────────────
    let client = Client::new();
    let workbook = pipeline::run(&client, &cfg).await?;

    info!(path = %workbook.display(), "all done");
    Ok(())
}
