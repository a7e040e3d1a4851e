//! Loads a config file and builds the manifest repositories it describes.

use std::sync::Arc;
use tempfile::TempDir;
use xcontrol_core::download::{DownloadIndex, DownloadListingRepository};
use xcontrol_core::manifest::ManifestRepository;
use xcontrol_infrastructure::{
    ConfigService, JsonManifestRepository, ManifestListingRepository, StaticEnv, XControlPaths,
};

#[tokio::test]
async fn test_repositories_follow_config() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    std::fs::write(
        root.join("all.json"),
        r#"[
            {"path": "", "entries": [{"name": "offline-package", "type": "dir"}]},
            {"path": "offline-package", "entries": [{"name": "agent.tar.gz", "type": "file"}]}
        ]"#,
    )
    .unwrap();
    std::fs::write(root.join("docs_index.json"), r#"{"docs": [], "collections": ["guides"]}"#)
        .unwrap();

    let config_path = root.join("xcontrol.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[downloads]
primary_manifest = "{primary}"
fallback_manifest = "{fallback}"

[manifests]
docs_index = "{docs}"
downloads_index = "{fallback}"
template_manifest = "{templates}"
"#,
            primary = root.join("artifacts-manifest.json").display(),
            fallback = root.join("all.json").display(),
            docs = root.join("docs_index.json").display(),
            templates = root.join("template-manifest.json").display(),
        ),
    )
    .unwrap();

    let env = StaticEnv::new();
    let resolved = XControlPaths::config_file(Some(&config_path), &env);
    let service = ConfigService::new(resolved, Arc::new(env));
    let config = service.get_config().await.unwrap();

    let listings = ManifestListingRepository::from_config(&config.downloads)
        .load_listings()
        .await
        .unwrap();
    let index = DownloadIndex::new(listings);
    let sections = index.build_download_sections();
    assert_eq!(sections.categories().len(), 1);
    assert_eq!(sections.categories()[0].sections[0].count, 1);

    let manifests = JsonManifestRepository::from_config(&config.manifests);
    let docs = manifests.docs_index().await.unwrap().unwrap();
    assert_eq!(docs["collections"][0], "guides");
    assert!(manifests.template_manifest().await.unwrap().is_none());
    assert!(manifests.downloads_index().await.unwrap().is_some());
}
