//! Download center use cases.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use xcontrol_core::download::{
    parse_segments, DownloadIndex, DownloadListingRepository, DownloadSections, DownloadSummary,
    ListingPage,
};
use xcontrol_core::Result;

/// Landing page data: figures plus every category.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadHome {
    #[serde(flatten)]
    pub summary: DownloadSummary,
    pub sections: DownloadSections,
}

/// Serves download pages from an index built once per process.
pub struct DownloadCenterService {
    repository: Arc<dyn DownloadListingRepository>,
    remote_base: String,
    /// Built on first use, dropped by [`Self::clear_cache`].
    index: RwLock<Option<Arc<DownloadIndex>>>,
}

impl DownloadCenterService {
    pub fn new(repository: Arc<dyn DownloadListingRepository>, remote_base: impl Into<String>) -> Self {
        Self {
            repository,
            remote_base: remote_base.into(),
            index: RwLock::new(None),
        }
    }

    pub fn remote_base(&self) -> &str {
        &self.remote_base
    }

    /// The cached index, loading listings on first access.
    pub async fn index(&self) -> Result<Arc<DownloadIndex>> {
        if let Some(index) = self.index.read().await.as_ref() {
            return Ok(index.clone());
        }

        let mut slot = self.index.write().await;
        // Another request may have loaded it while we waited for the lock.
        if let Some(index) = slot.as_ref() {
            return Ok(index.clone());
        }
        let listings = self.repository.load_listings().await?;
        tracing::info!("Download index built from {} listings", listings.len());
        let index = Arc::new(DownloadIndex::new(listings));
        *slot = Some(index.clone());
        Ok(index)
    }

    pub async fn clear_cache(&self) {
        *self.index.write().await = None;
    }

    pub async fn home(&self) -> Result<DownloadHome> {
        let index = self.index().await?;
        let sections = index.build_download_sections();
        Ok(DownloadHome {
            summary: index.summary(&sections),
            sections,
        })
    }

    /// Listing page for a raw request path (`offline-package/agent`).
    ///
    /// Returns `None` for unknown listings, the bare root, and paths with
    /// `.`/`..` segments.
    pub async fn listing(&self, raw_path: &str) -> Result<Option<ListingPage>> {
        let Some(segments) = parse_segments(raw_path) else {
            tracing::debug!("Rejected download path '{}'", raw_path);
            return Ok(None);
        };
        let index = self.index().await?;
        Ok(index.listing_page(&segments, &self.remote_base))
    }

    /// Sections restricted to listings under `prefix`.
    pub async fn scoped_sections(&self, prefix: &str) -> Result<DownloadSections> {
        Ok(self.index().await?.scoped(prefix).build_download_sections())
    }

    /// All listing paths, for static page generation.
    pub async fn paths(&self) -> Result<Vec<String>> {
        Ok(self.index().await?.paths())
    }
}
