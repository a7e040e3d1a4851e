//! Download listing repository trait.

use super::model::DirListing;
use crate::error::Result;

/// Source of the download manifest.
///
/// Implementations read a prebuilt manifest (local file, remote URL). A
/// missing or malformed manifest is not an error at this level: it loads as
/// an empty list so the download center renders empty rather than failing.
#[async_trait::async_trait]
pub trait DownloadListingRepository: Send + Sync {
    /// Loads every directory listing of the mirror.
    async fn load_listings(&self) -> Result<Vec<DirListing>>;
}
