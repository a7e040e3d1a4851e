//! CMS configuration model.
//!
//! The configuration names the active template, theme and extensions, and
//! the content sources markdown is read from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_TEMPLATE: &str = "default";
pub const DEFAULT_THEME: &str = "default";
pub const APP_SHELL_EXTENSION: &str = "app-shell";
pub const MARKDOWN_SYNC_EXTENSION: &str = "markdown-sync";

/// Where a content namespace is read from.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Filesystem,
    /// A directory hydrated ahead of time by a GitOps workflow.
    Git,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ContentSourceConfig {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    /// Root directory that stores markdown content.
    pub root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Branch or tag to fetch when GitOps is enabled.
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl ContentSourceConfig {
    pub fn filesystem(root: impl Into<String>) -> Self {
        Self {
            source_type: SourceType::Filesystem,
            root: root.into(),
            repository: None,
            reference: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ContentConfig {
    /// Namespace used when a section does not override its source.
    pub default_namespace: String,
    #[serde(default)]
    pub sources: BTreeMap<String, ContentSourceConfig>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        let mut sources = BTreeMap::new();
        sources.insert(
            "homepage".to_string(),
            ContentSourceConfig::filesystem("content/homepage"),
        );
        sources.insert("docs".to_string(), ContentSourceConfig::filesystem("content/docs"));
        Self {
            default_namespace: "homepage".to_string(),
            sources,
        }
    }
}

/// The `[cms]` configuration section.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CmsConfig {
    pub template: String,
    pub theme: String,
    /// Active extensions; the first one wraps outermost.
    pub extensions: Vec<String>,
    pub content: ContentConfig,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            theme: DEFAULT_THEME.to_string(),
            extensions: vec![
                APP_SHELL_EXTENSION.to_string(),
                MARKDOWN_SYNC_EXTENSION.to_string(),
            ],
            content: ContentConfig::default(),
        }
    }
}

/// Public description of a content source (no filesystem roots).
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ContentSourceMetadata {
    pub namespace: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl CmsConfig {
    pub fn content_sources_metadata(&self) -> Vec<ContentSourceMetadata> {
        self.content
            .sources
            .iter()
            .map(|(namespace, source)| ContentSourceMetadata {
                namespace: namespace.clone(),
                source_type: source.source_type,
                repository: source.repository.clone(),
                reference: source.reference.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cms_config_from_partial_toml() {
        let toml_str = r#"
            theme = "midnight"

            [content]
            default_namespace = "docs"

            [content.sources.marketing]
            type = "git"
            root = "cms/content/marketing"
            repository = "git@github.com:example/marketing.git"
            ref = "main"
        "#;
        let config: CmsConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.template, DEFAULT_TEMPLATE);
        assert_eq!(config.theme, "midnight");
        assert_eq!(config.extensions, vec!["app-shell", "markdown-sync"]);

        let metadata = config.content_sources_metadata();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0].namespace, "marketing");
        assert_eq!(metadata[0].source_type, SourceType::Git);
        assert_eq!(metadata[0].reference.as_deref(), Some("main"));
    }
}
