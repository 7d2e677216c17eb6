// src/history/mod.rs

use anyhow::{Context, Result};
use std::{collections::BTreeSet, fs, path::Path};
use tracing::{debug, info, instrument};

use crate::process::utils::{parse_year, year_token};

/// Names of the immediate subdirectories of `root`, or an empty list when it does not exist.
pub fn local_dir_names(root: &Path) -> Result<Vec<String>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("reading directory {:?}", root))? {
        let entry = entry?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Keep only the archive URLs whose year has not been extracted under `output_root` yet.
///
/// A year counts as present when any subdirectory name *contains* it. Entries whose
/// trailing token is not numeric are always kept. When `output_root` does not exist
/// every entry is returned. Input order is preserved.
#[instrument(level = "info", skip(entries), fields(root = %output_root.display(), listed = entries.len()))]
pub fn filter_missing_years(entries: &[String], output_root: &Path) -> Result<Vec<String>> {
    if !output_root.exists() {
        info!("output root missing; nothing downloaded yet");
        return Ok(entries.to_vec());
    }

    let dirs = local_dir_names(output_root)?;
    let years: BTreeSet<&str> = entries
        .iter()
        .map(|u| year_token(u))
        .filter(|t| parse_year(t).is_some())
        .collect();

    let missing: Vec<&str> = years
        .into_iter()
        .filter(|year| {
            let present = dirs.iter().any(|d| d.contains(year));
            if present {
                debug!(year, "already downloaded");
            }
            !present
        })
        .collect();

    let filtered: Vec<String> = entries
        .iter()
        .filter(|url| {
            parse_year(year_token(url)).is_none() || missing.iter().any(|y| url.contains(y))
        })
        .cloned()
        .collect();

    info!(missing = ?missing, kept = filtered.len(), "filtered archive list");
    Ok(filtered)
}
