//! Live content fetch.
//!
//! The merge base is always read fresh: from an `http(s)://` URL with
//! caching disabled, or from a local file when the site is checked out.

use anyhow::{Context, Result};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::path::Path;
use tracing::debug;

use crate::constants::USER_AGENT;
use crate::models::ContentDocument;

/// Returns true if `location` is an http(s) URL.
#[must_use]
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Fetches the live content document from a URL or a file path.
pub async fn fetch_live(location: &str) -> Result<ContentDocument> {
    if is_remote(location) {
        fetch_remote(location).await
    } else {
        read_local(Path::new(location))
    }
}

async fn fetch_remote(url: &str) -> Result<ContentDocument> {
    debug!("Fetching live content from {}", url);

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;

    let resp = client
        .get(url)
        .header(CACHE_CONTROL, "no-cache, no-store")
        .header(PRAGMA, "no-cache")
        .send()
        .await
        .with_context(|| format!("Failed to fetch live content: {url}"))?;

    if !resp.status().is_success() {
        anyhow::bail!("Failed to fetch live content: {url} returned HTTP {}", resp.status());
    }

    let text = resp
        .text()
        .await
        .with_context(|| format!("Failed to read live content body: {url}"))?;

    ContentDocument::from_json(&text)
        .with_context(|| format!("Live content is not a valid content document: {url}"))
}

/// Reads a content document from disk.
pub fn read_local(path: &Path) -> Result<ContentDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read live content: {}", path.display()))?;

    ContentDocument::from_json(&text)
        .with_context(|| format!("Live content is not a valid content document: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://lodge.example/data/content.json"));
        assert!(is_remote("http://127.0.0.1:3000/data/content.json"));
        assert!(!is_remote("data/content.json"));
        assert!(!is_remote("/srv/site/data/content.json"));
    }

    #[tokio::test]
    async fn test_fetch_live_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("content.json");
        std::fs::write(&path, r#"{"brand":{"name":"LODGE"},"gallery":{"items":[]}}"#).unwrap();

        let doc = fetch_live(path.to_str().unwrap()).await.unwrap();
        assert_eq!(doc.brand.name, "LODGE");
    }

    #[tokio::test]
    async fn test_fetch_live_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        let err = fetch_live(path.to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read live content"));
    }

    #[test]
    fn test_read_local_rejects_non_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("content.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(read_local(&path).is_err());
    }
}
