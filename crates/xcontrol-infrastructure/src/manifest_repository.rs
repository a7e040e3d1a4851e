//! JSON manifest repositories.

use crate::manifest_source::ManifestSource;
use async_trait::async_trait;
use serde_json::Value;
use xcontrol_core::config::{DownloadsConfig, ManifestsConfig};
use xcontrol_core::download::{DirListing, DownloadListingRepository};
use xcontrol_core::manifest::ManifestRepository;
use xcontrol_core::Result;

/// Directory listings from a primary manifest with an optional fallback.
///
/// The fallback is consulted when the primary is missing, unreadable, not a
/// JSON array, or yields no listings. Neither source failing is an error:
/// the result is then simply empty.
pub struct ManifestListingRepository {
    primary: ManifestSource,
    fallback: Option<ManifestSource>,
    client: reqwest::Client,
}

impl ManifestListingRepository {
    pub fn new(primary: ManifestSource, fallback: Option<ManifestSource>) -> Self {
        Self {
            primary,
            fallback,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &DownloadsConfig) -> Self {
        Self::new(
            ManifestSource::parse(&config.primary_manifest),
            config.fallback_manifest.as_deref().map(ManifestSource::parse),
        )
    }

    async fn read_listings(&self, source: &ManifestSource) -> Vec<DirListing> {
        match source.fetch_json(&self.client).await {
            Ok(Some(value)) => parse_listings(&value, source),
            Ok(None) => {
                tracing::debug!("Download manifest {} not found", source);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to load download manifest {}: {}", source, e);
                Vec::new()
            }
        }
    }
}

/// Parses a listing array, skipping malformed entries.
fn parse_listings(value: &Value, source: &ManifestSource) -> Vec<DirListing> {
    let Some(items) = value.as_array() else {
        tracing::warn!("Download manifest {} is not an array", source);
        return Vec::new();
    };
    let listings: Vec<DirListing> = items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!("Skipping malformed listing in {}: {}", source, e);
                None
            }
        })
        .collect();
    listings
}

#[async_trait]
impl DownloadListingRepository for ManifestListingRepository {
    async fn load_listings(&self) -> Result<Vec<DirListing>> {
        let listings = self.read_listings(&self.primary).await;
        if !listings.is_empty() {
            tracing::debug!("Loaded {} listings from {}", listings.len(), self.primary);
            return Ok(listings);
        }

        let Some(fallback) = &self.fallback else {
            return Ok(listings);
        };
        tracing::warn!(
            "Primary download manifest {} empty, falling back to {}",
            self.primary,
            fallback
        );
        Ok(self.read_listings(fallback).await)
    }
}

/// Docs, downloads and template manifests read as raw JSON.
pub struct JsonManifestRepository {
    docs_index: ManifestSource,
    downloads_index: ManifestSource,
    template_manifest: ManifestSource,
    client: reqwest::Client,
}

impl JsonManifestRepository {
    pub fn new(
        docs_index: ManifestSource,
        downloads_index: ManifestSource,
        template_manifest: ManifestSource,
    ) -> Self {
        Self {
            docs_index,
            downloads_index,
            template_manifest,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ManifestsConfig) -> Self {
        Self::new(
            ManifestSource::parse(&config.docs_index),
            ManifestSource::parse(&config.downloads_index),
            ManifestSource::parse(&config.template_manifest),
        )
    }
}

#[async_trait]
impl ManifestRepository for JsonManifestRepository {
    async fn docs_index(&self) -> Result<Option<Value>> {
        self.docs_index.fetch_json(&self.client).await
    }

    async fn downloads_index(&self) -> Result<Option<Value>> {
        self.downloads_index.fetch_json(&self.client).await
    }

    async fn template_manifest(&self) -> Result<Option<Value>> {
        self.template_manifest.fetch_json(&self.client).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn file(dir: &Path, name: &str, content: &str) -> ManifestSource {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        ManifestSource::File(path)
    }

    const LISTINGS: &str = r#"[
        {"path": "", "entries": [{"name": "tools", "type": "dir"}]},
        {"path": "tools", "entries": [{"name": "a.tar.gz", "type": "file"}]}
    ]"#;

    #[tokio::test]
    async fn test_primary_used_when_present() {
        let dir = TempDir::new().unwrap();
        let repo = ManifestListingRepository::new(
            file(dir.path(), "primary.json", LISTINGS),
            Some(file(dir.path(), "fallback.json", "[]")),
        );
        assert_eq!(repo.load_listings().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_primary_falls_back() {
        let dir = TempDir::new().unwrap();
        for primary in ["[]", r#"{"not": "an array"}"#, "garbage"] {
            let repo = ManifestListingRepository::new(
                file(dir.path(), "primary.json", primary),
                Some(file(dir.path(), "fallback.json", LISTINGS)),
            );
            assert_eq!(repo.load_listings().await.unwrap().len(), 2, "primary {primary}");
        }

        let repo = ManifestListingRepository::new(
            ManifestSource::File(dir.path().join("missing.json")),
            Some(file(dir.path(), "fallback.json", LISTINGS)),
        );
        assert_eq!(repo.load_listings().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_everything_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = ManifestListingRepository::new(
            ManifestSource::File(dir.path().join("a.json")),
            Some(ManifestSource::File(dir.path().join("b.json"))),
        );
        assert!(repo.load_listings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_listings_are_skipped() {
        let dir = TempDir::new().unwrap();
        let repo = ManifestListingRepository::new(
            file(
                dir.path(),
                "primary.json",
                r#"[{"path": "ok", "entries": []}, {"entries": "nope"}, 7]"#,
            ),
            None,
        );
        let listings = repo.load_listings().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].path, "ok");
    }

    #[tokio::test]
    async fn test_json_manifest_repository() {
        let dir = TempDir::new().unwrap();
        let repo = JsonManifestRepository::new(
            file(dir.path(), "docs_index.json", r#"{"docs": [], "collections": []}"#),
            ManifestSource::File(dir.path().join("missing.json")),
            file(dir.path(), "template-manifest.json", "{oops"),
        );
        assert!(repo.docs_index().await.unwrap().is_some());
        assert!(repo.downloads_index().await.unwrap().is_none());
        assert!(repo.template_manifest().await.is_err());
    }
}
