//! Documentation index.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocEntry {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub path_segments: Vec<String>,
}

/// Body served when the docs index has not been generated.
pub fn empty_docs_index() -> Value {
    json!({ "docs": [], "collections": [] })
}

/// Body served when the downloads index has not been generated.
pub fn empty_downloads_index() -> Value {
    json!({ "downloads": [], "categories": [] })
}

/// Extracts the `docs` entries of an index body, skipping malformed ones.
pub fn doc_entries(index: &Value) -> Vec<DocEntry> {
    index
        .get("docs")
        .and_then(Value::as_array)
        .map(|docs| {
            docs.iter()
                .filter_map(|doc| serde_json::from_value(doc.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
