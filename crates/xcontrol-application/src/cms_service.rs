//! CMS page composition use case.

use serde::Serialize;
use xcontrol_core::cms::{
    CmsExtension, CmsRuntime, CmsTemplate, CmsTheme, ComponentRef, ContentSourceMetadata, PageNode,
};

/// The active CMS selection and a composed page.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CmsOverview<'a> {
    pub template: &'a CmsTemplate,
    pub theme: &'a CmsTheme,
    pub extensions: Vec<&'a CmsExtension>,
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<&'a ComponentRef>,
    pub tree: PageNode,
    pub content_sources: Vec<ContentSourceMetadata>,
}

pub struct CmsService {
    runtime: CmsRuntime,
}

impl CmsService {
    pub fn new(runtime: CmsRuntime) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &CmsRuntime {
        &self.runtime
    }

    /// Composes `page` of the active template.
    ///
    /// The page content is the template's component for `page`, or the page
    /// name itself when the template does not define it.
    pub fn compose(&self, page: &str, bypass_app_shell: bool) -> PageNode {
        let content = match self.runtime.page_component(page) {
            Some(component) => PageNode::content(component.as_str()),
            None => PageNode::content(page),
        };
        let content = if bypass_app_shell {
            PageNode::bypass_app_shell(content)
        } else {
            content
        };
        self.runtime.compose_page(content)
    }

    pub fn overview(&self, page: &str, bypass_app_shell: bool) -> CmsOverview<'_> {
        CmsOverview {
            template: self.runtime.active_template(),
            theme: self.runtime.active_theme(),
            extensions: self.runtime.active_extensions(),
            page: page.to_string(),
            component: self.runtime.page_component(page),
            tree: self.compose(page, bypass_app_shell),
            content_sources: self.runtime.content_sources(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use xcontrol_core::cms::{CmsConfig, CmsRegistry};

    fn service() -> CmsService {
        CmsService::new(CmsRuntime::new(
            Arc::new(CmsRegistry::builtin()),
            CmsConfig::default(),
        ))
    }

    #[test]
    fn test_compose_home() {
        let tree = service().compose("home", false);
        assert_eq!(
            tree.outline(),
            vec![
                "themes/default/PassthroughThemeProvider",
                "extensions/markdown-sync/MarkdownContentProvider",
                "extensions/app-shell/AppShellLayout",
                "templates/default/HomePage",
            ]
        );
    }

    #[test]
    fn test_bypass_and_unknown_page() {
        let tree = service().compose("login", true);
        let outline = tree.outline();
        assert!(!outline.iter().any(|c| c.contains("AppShellLayout")));
        assert_eq!(outline.last().map(String::as_str), Some("login"));
    }

    #[test]
    fn test_overview_serializes() {
        let service = service();
        let body = serde_json::to_value(service.overview("home", false)).unwrap();
        assert_eq!(body["template"]["name"], "default");
        assert_eq!(body["extensions"][0]["name"], "app-shell");
        assert_eq!(body["component"], "templates/default/HomePage");
        assert_eq!(body["contentSources"].as_array().map(Vec::len), Some(2));
    }
}
