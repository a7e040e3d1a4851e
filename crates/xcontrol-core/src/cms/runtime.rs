//! Extension runtime: resolves the active CMS selection and composes pages.

use super::model::{APP_SHELL_EXTENSION, CmsConfig, ContentSourceMetadata};
use super::page::{ComponentRef, PageNode};
use super::registry::{CmsExtension, CmsRegistry, CmsTemplate, CmsTheme};
use std::sync::Arc;

/// Resolves the configured template/theme/extensions against a registry.
///
/// Unknown names never fail: an unknown template or theme falls back to the
/// registry default, and unknown extensions are skipped.
#[derive(Debug, Clone)]
pub struct CmsRuntime {
    registry: Arc<CmsRegistry>,
    config: CmsConfig,
}

impl CmsRuntime {
    pub fn new(registry: Arc<CmsRegistry>, config: CmsConfig) -> Self {
        if registry.template(&config.template).is_none() {
            tracing::warn!(
                "Unknown CMS template '{}', falling back to default",
                config.template
            );
        }
        if registry.theme(&config.theme).is_none() {
            tracing::warn!("Unknown CMS theme '{}', falling back to default", config.theme);
        }
        for name in &config.extensions {
            if registry.extension(name).is_none() {
                tracing::warn!("Unknown CMS extension '{}' ignored", name);
            }
        }
        Self { registry, config }
    }

    pub fn config(&self) -> &CmsConfig {
        &self.config
    }

    pub fn registry(&self) -> &CmsRegistry {
        &self.registry
    }

    pub fn active_template(&self) -> &CmsTemplate {
        self.registry
            .template(&self.config.template)
            .unwrap_or_else(|| self.registry.default_template())
    }

    pub fn active_theme(&self) -> &CmsTheme {
        self.registry
            .theme(&self.config.theme)
            .unwrap_or_else(|| self.registry.default_theme())
    }

    /// Active extensions in configuration order, unknown names removed.
    pub fn active_extensions(&self) -> Vec<&CmsExtension> {
        self.config
            .extensions
            .iter()
            .filter_map(|name| self.registry.extension(name))
            .collect()
    }

    pub fn collect_extension_providers(&self) -> Vec<&ComponentRef> {
        self.active_extensions()
            .into_iter()
            .flat_map(|extension| extension.providers.iter())
            .collect()
    }

    /// Wraps `content` in every active extension layout.
    ///
    /// The fold runs right to left so the first extension ends up outermost.
    /// Content marked with [`PageNode::AppShellBypass`] is unwrapped and the
    /// `app-shell` layout is left out.
    pub fn apply_extension_layouts(&self, content: PageNode) -> PageNode {
        let (content, skip_app_shell) = match content {
            PageNode::AppShellBypass { children } => (*children, true),
            other => (other, false),
        };

        self.active_extensions()
            .into_iter()
            .rev()
            .fold(content, |acc, extension| {
                let Some(layout) = &extension.layout else {
                    return acc;
                };
                if skip_app_shell && extension.name == APP_SHELL_EXTENSION {
                    return acc;
                }
                PageNode::wrap(layout.clone(), acc)
            })
    }

    /// The full page tree: theme provider, then extension providers, then
    /// layouts around the content.
    pub fn compose_page(&self, content: PageNode) -> PageNode {
        let laid_out = self.apply_extension_layouts(content);
        let provided = self
            .collect_extension_providers()
            .into_iter()
            .rev()
            .fold(laid_out, |acc, provider| PageNode::wrap(provider.clone(), acc));

        match &self.active_theme().provider {
            Some(provider) => PageNode::wrap(provider.clone(), provided),
            None => provided,
        }
    }

    /// The component rendering `page` in the active template.
    pub fn page_component(&self, page: &str) -> Option<&ComponentRef> {
        self.active_template().page(page)
    }

    pub fn content_sources(&self) -> Vec<ContentSourceMetadata> {
        self.config.content_sources_metadata()
    }
}
