// src/process/mod.rs
use anyhow::{Context, Result};
use std::{
    collections::{btree_map::Entry, BTreeMap},
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

pub mod date_parser;
pub mod raw_table;
pub mod schema;
pub mod utils;

pub use raw_table::RawTable;

use crate::history::local_dir_names;
use schema::{ensure_same_columns, keep_latest_per_registrant, normalize_identity_columns};
use utils::{dataset_key, is_snapshot, max_year};

/// Dataset key → every fragment of that dataset, concatenated.
pub type UnifiedTables = BTreeMap<String, RawTable>;

/// Regular files directly inside `dir`, sorted by name.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading directory {:?}", dir))? {
        let path = entry?.path();
        if !path.is_dir() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Fold one prepared fragment into `tables`. The column check happens before
/// anything is touched, so a mismatch leaves `tables` as it was.
pub fn merge_fragment(
    tables: &mut UnifiedTables,
    key: String,
    table: RawTable,
    path: &Path,
) -> Result<()> {
    match tables.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(table);
        }
        Entry::Occupied(mut slot) => {
            ensure_same_columns(slot.get(), &table, path)?;
            slot.get_mut().append(table)?;
        }
    }
    Ok(())
}

/// Load one fragment and bring it to the unified shape: snapshot files are
/// reduced to the latest row per registrant, identity columns are renamed.
pub fn prepare_fragment(path: &Path, file_name: &str) -> Result<RawTable> {
    let mut table = raw_table::load_latin1_csv(path)?;
    if is_snapshot(file_name) {
        let before = table.len();
        keep_latest_per_registrant(&mut table, path)?;
        debug!(file = file_name, before, after = table.len(), "snapshot deduplicated");
    }
    normalize_identity_columns(&mut table);
    Ok(table)
}

/// Walk every year directory under `root` and merge same-keyed fragments.
///
/// `skip_dir` names a subdirectory to leave out (the workbook destination).
/// Snapshot files are only taken from the most recent year present; older
/// snapshots are ignored. Any column-set mismatch aborts the whole run.
#[instrument(level = "info", skip(root), fields(root = %root.display()))]
pub fn unify_dir(root: &Path, skip_dir: &str) -> Result<UnifiedTables> {
    let dirs: Vec<String> = local_dir_names(root)?
        .into_iter()
        .filter(|d| d != skip_dir)
        .collect();
    let last_year = max_year(dirs.iter().map(String::as_str)).to_string();
    info!(dirs = dirs.len(), last_year = %last_year, "unifying");

    let mut tables = UnifiedTables::new();
    for dir in &dirs {
        for path in list_files(&root.join(dir))? {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            if is_snapshot(&file_name) && !file_name.contains(&last_year) {
                debug!(file = %file_name, "stale snapshot skipped");
                continue;
            }

            let key = dataset_key(&file_name);
            let table = prepare_fragment(&path, &file_name)?;
            let rows = table.len();
            merge_fragment(&mut tables, key.clone(), table, &path)?;
            info!(file = %file_name, key = %key, rows, "[OK] file unified");
        }
    }

    info!(tables = tables.len(), "unification finished");
    Ok(tables)
}
