//! Docs, downloads and template manifests with empty fallbacks.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;
use xcontrol_core::manifest::{
    doc_entries, empty_docs_index, empty_downloads_index, DocEntry, ManifestRepository,
    TemplateManifest,
};

pub struct ManifestService {
    repository: Arc<dyn ManifestRepository>,
    templates: OnceCell<TemplateManifest>,
}

impl ManifestService {
    pub fn new(repository: Arc<dyn ManifestRepository>) -> Self {
        Self {
            repository,
            templates: OnceCell::new(),
        }
    }

    /// The docs index, or `{docs: [], collections: []}`.
    pub async fn docs_index(&self) -> Value {
        match self.repository.docs_index().await {
            Ok(Some(index)) => index,
            Ok(None) => {
                tracing::debug!("Docs index not generated, serving empty index");
                empty_docs_index()
            }
            Err(e) => {
                tracing::warn!("Failed to load docs index: {}", e);
                empty_docs_index()
            }
        }
    }

    pub async fn docs(&self) -> Vec<DocEntry> {
        doc_entries(&self.docs_index().await)
    }

    /// The raw downloads index, or `{downloads: [], categories: []}`.
    pub async fn downloads_index(&self) -> Value {
        match self.repository.downloads_index().await {
            Ok(Some(index)) => index,
            Ok(None) => {
                tracing::debug!("Downloads index not generated, serving empty index");
                empty_downloads_index()
            }
            Err(e) => {
                tracing::warn!("Failed to load downloads index: {}", e);
                empty_downloads_index()
            }
        }
    }

    /// The template manifest, read once per process.
    pub async fn template_manifest(&self) -> &TemplateManifest {
        self.templates
            .get_or_init(|| async {
                let manifest = match self.repository.template_manifest().await {
                    Ok(Some(value)) => serde_json::from_value(value).map_err(|e| e.to_string()),
                    Ok(None) => Err("not generated".to_string()),
                    Err(e) => Err(e.to_string()),
                };
                manifest.unwrap_or_else(|reason| {
                    tracing::warn!("Template manifest unavailable ({}), serving empty manifest", reason);
                    TemplateManifest::empty(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
                })
            })
            .await
    }

    /// The manifest, optionally restricted to one category.
    pub async fn templates(&self, category: Option<&str>) -> TemplateManifest {
        let manifest = self.template_manifest().await;
        match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(category) => manifest.filtered(category),
            None => manifest.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use xcontrol_core::{Result, XControlError};

    #[derive(Default)]
    struct FakeManifests {
        docs: Option<Value>,
        templates: Option<Value>,
        template_loads: AtomicUsize,
    }

    #[async_trait]
    impl ManifestRepository for FakeManifests {
        async fn docs_index(&self) -> Result<Option<Value>> {
            Ok(self.docs.clone())
        }

        async fn downloads_index(&self) -> Result<Option<Value>> {
            Err(XControlError::io("disk on fire"))
        }

        async fn template_manifest(&self) -> Result<Option<Value>> {
            self.template_loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.templates.clone())
        }
    }

    #[tokio::test]
    async fn test_fallback_bodies() {
        let service = ManifestService::new(Arc::new(FakeManifests::default()));
        assert_eq!(service.docs_index().await, json!({"docs": [], "collections": []}));
        assert_eq!(
            service.downloads_index().await,
            json!({"downloads": [], "categories": []})
        );
        let manifest = service.template_manifest().await;
        assert_eq!(manifest.version, "1.0.0");
        assert_eq!(manifest.count, 0);
        assert!(!manifest.generated_at.is_empty());
    }

    #[tokio::test]
    async fn test_templates_cached_and_filtered() {
        let repository = Arc::new(FakeManifests {
            templates: Some(json!({
                "version": "2.0.0",
                "generatedAt": "2024-01-01T00:00:00Z",
                "templates": [
                    {"id": "a", "path": "templates/a", "category": "landing"},
                    {"id": "b", "path": "templates/b", "category": "blog"}
                ],
                "count": 2
            })),
            ..Default::default()
        });
        let service = ManifestService::new(repository.clone());

        assert_eq!(service.templates(None).await.count, 2);
        let landing = service.templates(Some("landing")).await;
        assert_eq!(landing.count, 1);
        assert_eq!(landing.templates[0].id, "a");
        assert_eq!(service.templates(Some("  ")).await.count, 2);
        assert_eq!(repository.template_loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_docs_entries() {
        let repository = FakeManifests {
            docs: Some(json!({"docs": [{"slug": "intro", "title": "Intro"}], "collections": []})),
            ..Default::default()
        };
        let service = ManifestService::new(Arc::new(repository));
        let docs = service.docs().await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].slug, "intro");
    }
}
