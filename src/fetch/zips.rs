use anyhow::{Context, Result};
use reqwest::Client;
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{info, instrument};
use url::Url;
use zip::ZipArchive;

use crate::error::DownloadError;

/// Last path segment of an archive URL, e.g. `inf_trimestral_fii_2023.zip`.
pub fn archive_file_name(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("download.zip")
}

/// Download the given archive URL and save it under `dest_dir` using the original filename.
/// Returns the full path of the saved file.
///
/// Nothing is written when the request fails or answers with a non-2xx status.
#[instrument(level = "info", skip(client, dest_dir), fields(dest = %dest_dir.as_ref().display()))]
pub async fn download_zip(
    client: &Client,
    url_str: &str,
    dest_dir: impl AsRef<Path>,
) -> Result<PathBuf, DownloadError> {
    let dest_dir = dest_dir.as_ref();
    let url = Url::parse(url_str).map_err(|_| DownloadError::InvalidUrl(url_str.to_string()))?;
    let dest_path = dest_dir.join(archive_file_name(&url));

    let http = |source| DownloadError::Http {
        url: url_str.to_string(),
        source,
    };
    let bytes = client
        .get(url.as_str())
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(http)?
        .bytes()
        .await
        .map_err(http)?;

    fs::create_dir_all(dest_dir)
        .await
        .map_err(|source| DownloadError::Io {
            path: dest_dir.to_path_buf(),
            source,
        })?;
    fs::write(&dest_path, &bytes)
        .await
        .map_err(|source| DownloadError::Io {
            path: dest_path.clone(),
            source,
        })?;

    info!(path = %dest_path.display(), size = bytes.len(), "[OK] archive downloaded");
    Ok(dest_path)
}

/// Directory an archive unpacks into: its file name cut at the first `.`,
/// next to the archive itself (`out/doc_2023.zip` → `out/doc_2023`).
pub fn extraction_dir(zip_path: &Path) -> PathBuf {
    let name = zip_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    match zip_path.parent() {
        Some(parent) => parent.join(stem),
        None => PathBuf::from(stem),
    }
}

/// Unpack every member of `zip_path` into [`extraction_dir`], creating it if needed.
/// Corrupt archives and I/O failures are returned to the caller.
#[instrument(level = "info", skip(zip_path), fields(path = %zip_path.as_ref().display()))]
pub fn extract_zip<P: AsRef<Path>>(zip_path: P) -> Result<PathBuf> {
    let zip_path = zip_path.as_ref();
    let target = extraction_dir(zip_path);
    std::fs::create_dir_all(&target).with_context(|| format!("creating {:?}", target))?;

    let file =
        File::open(zip_path).with_context(|| format!("Failed to open ZIP file: {:?}", zip_path))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {:?}", zip_path))?;
    archive
        .extract(&target)
        .with_context(|| format!("extracting {:?} into {:?}", zip_path, target))?;

    info!(dir = %target.display(), members = archive.len(), "[OK] archive extracted");
    Ok(target)
}
