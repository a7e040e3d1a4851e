//! Repository trait for prebuilt JSON manifests.

use crate::error::Result;
use serde_json::Value;

/// Source of the prebuilt docs, downloads and template manifests.
///
/// Each method returns `Ok(None)` when the manifest does not exist;
/// callers substitute the empty fallback body.
#[async_trait::async_trait]
pub trait ManifestRepository: Send + Sync {
    async fn docs_index(&self) -> Result<Option<Value>>;

    async fn downloads_index(&self) -> Result<Option<Value>>;

    async fn template_manifest(&self) -> Result<Option<Value>>;
}
