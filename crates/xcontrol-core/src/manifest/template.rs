//! Template manifest produced by the static template scanner.

use serde::{Deserialize, Serialize};

pub const EMPTY_MANIFEST_VERSION: &str = "1.0.0";

/// One template discovered by the manifest build.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub id: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateManifest {
    pub version: String,
    pub generated_at: String,
    #[serde(default)]
    pub templates: Vec<TemplateInfo>,
    #[serde(default)]
    pub count: usize,
}

impl TemplateManifest {
    /// The manifest served when none has been generated yet.
    pub fn empty(generated_at: impl Into<String>) -> Self {
        Self {
            version: EMPTY_MANIFEST_VERSION.to_string(),
            generated_at: generated_at.into(),
            templates: Vec::new(),
            count: 0,
        }
    }

    pub fn all(&self) -> &[TemplateInfo] {
        &self.templates
    }

    pub fn by_id(&self, id: &str) -> Option<&TemplateInfo> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub fn by_category(&self, category: &str) -> Vec<&TemplateInfo> {
        self.templates
            .iter()
            .filter(|template| template.category.as_deref() == Some(category))
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for category in self.templates.iter().filter_map(|t| t.category.as_deref()) {
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    /// A copy restricted to `category`, with `count` recomputed.
    pub fn filtered(&self, category: &str) -> Self {
        let templates: Vec<TemplateInfo> = self.by_category(category).into_iter().cloned().collect();
        Self {
            version: self.version.clone(),
            generated_at: self.generated_at.clone(),
            count: templates.len(),
            templates,
        }
    }
}
