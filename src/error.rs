// src/error.rs

use std::{collections::BTreeSet, path::PathBuf};
use thiserror::Error;

/// Failure while fetching a single archive.
///
/// `Http` is recoverable: the archive is skipped and the run continues.
/// `Io` means the archive could not be persisted locally and aborts the run.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("writing {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid archive URL {0}")]
    InvalidUrl(String),
}

impl DownloadError {
    /// Whether the run may continue without this archive.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DownloadError::Io { .. })
    }
}

/// Fatal conditions raised while unifying fragment tables.
#[derive(Debug, Error)]
pub enum UnifyError {
    #[error(
        "column mismatch in {path:?}\n\
         expected: {expected:?}\n\
         got:      {got:?}\n\
         missing from file: {missing:?}\n\
         unexpected in file: {unexpected:?}"
    )]
    SchemaMismatch {
        path: PathBuf,
        expected: Vec<String>,
        got: Vec<String>,
        missing: BTreeSet<String>,
        unexpected: BTreeSet<String>,
    },

    #[error("{path:?}: required column `{column}` is missing")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path:?}: cannot parse `{value}` in column `{column}` (data row {row})")]
    BadDate {
        path: PathBuf,
        column: String,
        value: String,
        row: usize,
    },
}
