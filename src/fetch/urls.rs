// src/fetch/urls.rs
use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, instrument};
use url::Url;

/// Fetch the listing page at `base_url` and return every linked archive URL
/// whose href ends with `extension`. Any network or parse failure is fatal.
#[instrument(level = "info", skip(client))]
pub async fn fetch_archive_urls(
    client: &Client,
    base_url: &str,
    extension: &str,
) -> Result<Vec<String>> {
    let base = Url::parse(base_url).with_context(|| format!("parsing listing URL {}", base_url))?;
    let html = client
        .get(base.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", base))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", base))?
        .text()
        .await
        .with_context(|| format!("reading body from {}", base))?;

    let links = parse_archive_links(&html, &base, extension);
    debug!(count = links.len(), "archive links found");
    Ok(links)
}

/// Pull `<a href>` targets ending with `extension` out of `html`, resolved
/// against `base`. Page order is kept and repeated links appear once.
pub fn parse_archive_links(html: &str, base: &Url, extension: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("selector should parse");
    let mut seen = HashSet::new();

    document
        .select(&selector)
        .filter_map(|elem| elem.value().attr("href"))
        .filter(|href| href.ends_with(extension))
        .filter_map(|href| base.join(href).ok())
        .map(|u| u.to_string())
        .filter(|u| seen.insert(u.clone()))
        .collect()
}
