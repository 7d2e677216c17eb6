// src/config.rs

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use url::Url;

/// CVM quarterly FII disclosure listing.
pub const DEFAULT_BASE_URL: &str = "https://dados.cvm.gov.br/dados/FII/DOC/INF_TRIMESTRAL/DADOS/";

/// Everything the pipeline needs to know about where to read and write.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory listing that links to the archives.
    pub base_url: String,
    /// Root holding downloaded archives and their extracted year directories.
    pub output_root: PathBuf,
    /// Only links ending with this suffix are downloaded.
    pub extension: String,
    /// Name of the directory under `output_root` receiving the workbook.
    pub unified_dir: String,
    pub workbook_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_root: PathBuf::from("out"),
            extension: ".zip".to_string(),
            unified_dir: "unified".to_string(),
            workbook_name: "unified_files.xlsx".to_string(),
        }
    }
}

impl Config {
    /// Parse a YAML document. Missing keys fall back to the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(text).context("parsing YAML configuration")?;
        cfg.validated()
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {:?}", path))?;
        Self::from_yaml_str(&text).with_context(|| format!("loading {:?}", path))
    }

    /// Check invariants and normalize the base URL to end with `/`,
    /// so relative hrefs resolve inside the listing directory.
    pub fn validated(mut self) -> Result<Self> {
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        Url::parse(&self.base_url)
            .with_context(|| format!("base_url `{}` is not a valid URL", self.base_url))?;

        if self.extension.is_empty() {
            bail!("extension cannot be empty");
        }
        if self.unified_dir.is_empty() || self.unified_dir.contains(['/', '\\']) {
            bail!("unified_dir must be a single non-empty directory name");
        }
        if self.workbook_name.is_empty() {
            bail!("workbook_name cannot be empty");
        }
        Ok(self)
    }

    /// `<output_root>/<unified_dir>`
    pub fn unified_path(&self) -> PathBuf {
        self.output_root.join(&self.unified_dir)
    }
}
