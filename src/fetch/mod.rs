// src/fetch/mod.rs

/// Scraping archive links out of the regulator's directory listing.
pub mod urls;
/// Downloading archives to disk and unpacking them into year directories.
pub mod zips;
