// src/pipeline.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::{fs, path::PathBuf};
use tracing::{error, info, instrument};

use crate::{config::Config, export, fetch, history, process};

/// One full run: list → filter → download + extract → unify → export.
///
/// Archives that fail to download over HTTP are logged and skipped; every
/// other failure aborts the run. Returns the path of the written workbook.
#[instrument(level = "info", skip_all, fields(base = %cfg.base_url, root = %cfg.output_root.display()))]
pub async fn run(client: &Client, cfg: &Config) -> Result<PathBuf> {
    // ─── 1) discover archives ────────────────────────────────────────
    let listed = fetch::urls::fetch_archive_urls(client, &cfg.base_url, &cfg.extension).await?;
    info!("{} archives listed", listed.len());

    // ─── 2) skip years already extracted ─────────────────────────────
    let to_fetch = history::filter_missing_years(&listed, &cfg.output_root)?;
    fs::create_dir_all(&cfg.output_root)
        .with_context(|| format!("creating {:?}", cfg.output_root))?;

    // ─── 3) download + extract, one archive at a time ────────────────
    for url in &to_fetch {
        match fetch::zips::download_zip(client, url, &cfg.output_root).await {
            Ok(zip_path) => {
                fetch::zips::extract_zip(&zip_path)?;
            }
            Err(err) if err.is_recoverable() => {
                error!("[ERROR] download of {} failed: {}", url, err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    // ─── 4) unify and persist ────────────────────────────────────────
    let tables = process::unify_dir(&cfg.output_root, &cfg.unified_dir)?;
    export::write_workbook(&tables, cfg.unified_path(), &cfg.workbook_name)
}
