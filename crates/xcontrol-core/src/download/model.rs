//! Download manifest domain model.
//!
//! A manifest is a flat list of [`DirListing`]s produced by an offline
//! crawler. Each listing describes one directory of the artifact mirror.

use serde::{Deserialize, Serialize};

/// Kind of a directory entry.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
}

/// A single entry inside a directory listing.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::File,
            last_modified: None,
            size: None,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::Dir,
            last_modified: None,
            size: None,
        }
    }

    pub fn with_last_modified(mut self, timestamp: impl Into<String>) -> Self {
        self.last_modified = Some(timestamp.into());
        self
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Dir
    }

    /// Whether the entry name stays inside its parent directory.
    ///
    /// Names that are empty, `.`/`..`, or contain a separator would make the
    /// joined child path escape or alias the tree, so traversal skips them.
    pub fn is_contained(&self) -> bool {
        let name = self.name.trim();
        !name.is_empty() && name != "." && name != ".." && !name.contains('/')
    }
}

/// One directory of the download mirror.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DirListing {
    /// Slash-joined path relative to the mirror root (`""` is the root).
    pub path: String,
    #[serde(default)]
    pub entries: Vec<DirEntry>,
}

impl DirListing {
    pub fn new(path: impl Into<String>, entries: Vec<DirEntry>) -> Self {
        Self {
            path: path.into(),
            entries,
        }
    }

    /// The listing path without leading/trailing slashes.
    pub fn normalized_path(&self) -> String {
        normalize_path(&self.path)
    }

    pub fn files(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries.iter().filter(|entry| entry.is_file())
    }

    pub fn directories(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.is_dir() && entry.is_contained())
    }

    /// The most recent `lastModified` among the listing's entries.
    ///
    /// Timestamps are ISO-8601 strings, so lexical order is chronological.
    pub fn latest_modified(&self) -> Option<&str> {
        self.entries
            .iter()
            .filter_map(|entry| entry.last_modified.as_deref())
            .max()
    }
}

/// A navigable section: one subdirectory of a listing with its recursive file count.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSection {
    pub key: String,
    pub title: String,
    pub href: String,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// A top-level directory of the mirror and its sections.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DownloadCategory {
    pub key: String,
    pub title: String,
    pub sections: Vec<DownloadSection>,
}

/// Categories in the order the root listing names them.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct DownloadSections(pub Vec<DownloadCategory>);

impl DownloadSections {
    pub fn get(&self, key: &str) -> Option<&DownloadCategory> {
        self.0.iter().find(|category| category.key == key)
    }

    pub fn categories(&self) -> &[DownloadCategory] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of sections across all categories.
    pub fn total_collections(&self) -> usize {
        self.0.iter().map(|category| category.sections.len()).sum()
    }
}

/// Figures shown on the download center landing page.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSummary {
    pub top_level_count: usize,
    pub total_collections: usize,
    pub total_files: usize,
}

/// Everything needed to render a single listing page.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub segments: Vec<String>,
    pub title: String,
    pub subdirectory_sections: Vec<DownloadSection>,
    /// The listing restricted to its file entries.
    pub file_listing: DirListing,
    pub total_files: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_modified: Option<String>,
    pub relative_path: String,
    pub remote_path: String,
}

/// Trims surrounding slashes and collapses empty segments.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Splits a request path into clean segments.
///
/// Returns `None` when a segment would walk outside the mirror root.
pub fn parse_segments(raw: &str) -> Option<Vec<String>> {
    let mut segments = Vec::new();
    for segment in raw.split('/') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if segment == "." || segment == ".." {
            return None;
        }
        segments.push(segment.to_string());
    }
    Some(segments)
}

/// Turns a directory name into a display title (`offline-package` → `Offline Package`).
pub fn format_segment_label(segment: &str) -> String {
    segment
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_deserializes_from_manifest_json() {
        let json = r#"{"name":"xstream.dmg","type":"file","lastModified":"2024-05-01T10:00:00Z","size":1024}"#;
        let entry: DirEntry = serde_json::from_str(json).unwrap();
        assert!(entry.is_file());
        assert_eq!(entry.last_modified.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(entry.size, Some(1024));
    }

    #[test]
    fn test_listing_without_entries_defaults_to_empty() {
        let listing: DirListing = serde_json::from_str(r#"{"path":"xstream/"}"#).unwrap();
        assert!(listing.entries.is_empty());
        assert_eq!(listing.normalized_path(), "xstream");
    }

    #[test]
    fn test_contained_names() {
        assert!(DirEntry::dir("linux").is_contained());
        assert!(!DirEntry::dir("..").is_contained());
        assert!(!DirEntry::dir("").is_contained());
        assert!(!DirEntry::dir("a/b").is_contained());
    }

    #[test]
    fn test_parse_segments() {
        assert_eq!(
            parse_segments("/xstream//macos/ ").unwrap(),
            vec!["xstream".to_string(), "macos".to_string()]
        );
        assert!(parse_segments("").unwrap().is_empty());
        assert!(parse_segments("xstream/../etc").is_none());
    }

    #[test]
    fn test_format_segment_label() {
        assert_eq!(format_segment_label("offline-package"), "Offline Package");
        assert_eq!(format_segment_label("xstream_windows latest"), "Xstream Windows Latest");
        assert_eq!(format_segment_label("v0.2.0"), "V0.2.0");
        assert_eq!(format_segment_label(""), "");
    }

    #[test]
    fn test_latest_modified_picks_max() {
        let listing = DirListing::new(
            "xstream",
            vec![
                DirEntry::file("a").with_last_modified("2024-01-01T00:00:00Z"),
                DirEntry::file("b").with_last_modified("2024-03-01T00:00:00Z"),
                DirEntry::dir("c"),
            ],
        );
        assert_eq!(listing.latest_modified(), Some("2024-03-01T00:00:00Z"));
    }
}
