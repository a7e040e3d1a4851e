//! Template, theme and extension registries.
//!
//! Registries are assembled once at process start through
//! [`CmsRegistryBuilder`] and are read-only afterwards.

use super::model::{APP_SHELL_EXTENSION, DEFAULT_TEMPLATE, DEFAULT_THEME, MARKDOWN_SYNC_EXTENSION};
use super::page::ComponentRef;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// The page every template must provide.
pub const HOME_PAGE: &str = "home";

/// A named set of page components.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CmsTemplate {
    pub name: String,
    pub pages: BTreeMap<String, ComponentRef>,
}

impl CmsTemplate {
    pub fn new(name: impl Into<String>, home: ComponentRef) -> Self {
        let mut pages = BTreeMap::new();
        pages.insert(HOME_PAGE.to_string(), home);
        Self {
            name: name.into(),
            pages,
        }
    }

    pub fn with_page(mut self, page: impl Into<String>, component: ComponentRef) -> Self {
        self.pages.insert(page.into(), component);
        self
    }

    pub fn page(&self, page: &str) -> Option<&ComponentRef> {
        self.pages.get(page)
    }

    pub fn home(&self) -> Option<&ComponentRef> {
        self.page(HOME_PAGE)
    }
}

/// Document-level styling plus an optional provider wrapping the page.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CmsTheme {
    pub name: String,
    pub html_attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ComponentRef>,
}

impl CmsTheme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            html_attributes: BTreeMap::new(),
            body_class_name: None,
            provider: None,
        }
    }

    /// A theme that contributes nothing.
    pub fn passthrough() -> Self {
        Self::new(DEFAULT_THEME)
    }

    pub fn with_html_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.html_attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_body_class(mut self, class_name: impl Into<String>) -> Self {
        self.body_class_name = Some(class_name.into());
        self
    }

    pub fn with_provider(mut self, provider: ComponentRef) -> Self {
        self.provider = Some(provider);
        self
    }
}

/// A bundle of layout wrappers and context providers.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CmsExtension {
    pub name: String,
    pub providers: Vec<ComponentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<ComponentRef>,
}

impl CmsExtension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            providers: Vec::new(),
            layout: None,
        }
    }

    pub fn with_layout(mut self, layout: ComponentRef) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_provider(mut self, provider: ComponentRef) -> Self {
        self.providers.push(provider);
        self
    }
}

/// Frozen lookup tables for templates, themes and extensions.
///
/// A `default` template and a `default` theme always exist, so fallback
/// lookups never fail.
#[derive(Debug, Clone)]
pub struct CmsRegistry {
    templates: HashMap<String, CmsTemplate>,
    themes: HashMap<String, CmsTheme>,
    extensions: HashMap<String, CmsExtension>,
}

impl CmsRegistry {
    pub fn builder() -> CmsRegistryBuilder {
        CmsRegistryBuilder::default()
    }

    /// The registry shipped with the dashboard.
    pub fn builtin() -> Self {
        Self::builder().with_builtins().build()
    }

    pub fn template(&self, name: &str) -> Option<&CmsTemplate> {
        self.templates.get(name)
    }

    pub fn theme(&self, name: &str) -> Option<&CmsTheme> {
        self.themes.get(name)
    }

    pub fn extension(&self, name: &str) -> Option<&CmsExtension> {
        self.extensions.get(name)
    }

    pub fn default_template(&self) -> &CmsTemplate {
        // The builder guarantees presence.
        &self.templates[DEFAULT_TEMPLATE]
    }

    pub fn default_theme(&self) -> &CmsTheme {
        &self.themes[DEFAULT_THEME]
    }

    /// Registered template names, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn extension_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.extensions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Default)]
pub struct CmsRegistryBuilder {
    templates: HashMap<String, CmsTemplate>,
    themes: HashMap<String, CmsTheme>,
    extensions: HashMap<String, CmsExtension>,
}

impl CmsRegistryBuilder {
    /// Registers the default template, default theme, `app-shell` and `markdown-sync`.
    pub fn with_builtins(self) -> Self {
        self.register_template(
            CmsTemplate::new(DEFAULT_TEMPLATE, "templates/default/HomePage".into())
                .with_page("docs", "templates/default/DocsPage".into())
                .with_page("download", "templates/default/DownloadPage".into()),
        )
        .register_theme(
            CmsTheme::new(DEFAULT_THEME)
                .with_html_attribute("lang", "en")
                .with_body_class("bg-gray-50 text-gray-900")
                .with_provider("themes/default/PassthroughThemeProvider".into()),
        )
        .register_extension(
            CmsExtension::new(APP_SHELL_EXTENSION)
                .with_layout("extensions/app-shell/AppShellLayout".into()),
        )
        .register_extension(
            CmsExtension::new(MARKDOWN_SYNC_EXTENSION)
                .with_provider("extensions/markdown-sync/MarkdownContentProvider".into()),
        )
    }

    /// Registers a template; a later registration under the same name replaces it.
    pub fn register_template(mut self, template: CmsTemplate) -> Self {
        self.templates.insert(template.name.clone(), template);
        self
    }

    pub fn register_theme(mut self, theme: CmsTheme) -> Self {
        self.themes.insert(theme.name.clone(), theme);
        self
    }

    pub fn register_extension(mut self, extension: CmsExtension) -> Self {
        self.extensions.insert(extension.name.clone(), extension);
        self
    }

    pub fn build(mut self) -> CmsRegistry {
        self.templates
            .entry(DEFAULT_TEMPLATE.to_string())
            .or_insert_with(|| CmsTemplate::new(DEFAULT_TEMPLATE, "templates/blank/HomePage".into()));
        self.themes
            .entry(DEFAULT_THEME.to_string())
            .or_insert_with(CmsTheme::passthrough);

        CmsRegistry {
            templates: self.templates,
            themes: self.themes,
            extensions: self.extensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_contents() {
        let registry = CmsRegistry::builtin();
        assert_eq!(registry.template_names(), vec!["default"]);
        assert_eq!(registry.extension_names(), vec!["app-shell", "markdown-sync"]);
        assert!(registry.default_template().home().is_some());
        assert_eq!(
            registry.default_theme().html_attributes.get("lang").map(String::as_str),
            Some("en")
        );
    }

    #[test]
    fn test_empty_builder_still_has_defaults() {
        let registry = CmsRegistry::builder().build();
        assert_eq!(registry.default_template().name, DEFAULT_TEMPLATE);
        assert!(registry.default_theme().provider.is_none());
        assert!(registry.extension("app-shell").is_none());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let registry = CmsRegistry::builder()
            .with_builtins()
            .register_template(CmsTemplate::new("default", "custom/Home".into()))
            .build();
        assert_eq!(
            registry.default_template().home().map(ComponentRef::as_str),
            Some("custom/Home")
        );
    }
}
