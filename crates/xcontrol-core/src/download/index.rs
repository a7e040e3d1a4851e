//! Section building and lookups over a flat set of directory listings.

use super::model::{
    format_segment_label, normalize_path, DirListing, DownloadCategory, DownloadSection,
    DownloadSections, DownloadSummary, ListingPage,
};
use std::collections::HashMap;

/// Default public mirror used to build `remotePath` links.
pub const DEFAULT_REMOTE_BASE: &str = "https://dl.svc.plus";

/// Read-only index over a download manifest.
///
/// Listings are keyed by their normalized path so lookups by segment list are
/// O(1). When the manifest repeats a path, the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct DownloadIndex {
    listings: Vec<DirListing>,
    by_path: HashMap<String, usize>,
}

impl DownloadIndex {
    pub fn new(listings: Vec<DirListing>) -> Self {
        let mut by_path = HashMap::with_capacity(listings.len());
        for (position, listing) in listings.iter().enumerate() {
            by_path.entry(listing.normalized_path()).or_insert(position);
        }
        Self { listings, by_path }
    }

    pub fn listings(&self) -> &[DirListing] {
        &self.listings
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Finds the listing at the given segments (`[]` is the root listing).
    pub fn find_listing<S: AsRef<str>>(&self, segments: &[S]) -> Option<&DirListing> {
        let key = segments
            .iter()
            .map(|segment| segment.as_ref().trim_matches('/'))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        self.find_by_path(&key)
    }

    fn find_by_path(&self, path: &str) -> Option<&DirListing> {
        self.by_path
            .get(&normalize_path(path))
            .map(|&position| &self.listings[position])
    }

    fn child_listing(&self, parent: &DirListing, name: &str) -> Option<&DirListing> {
        let parent_path = parent.normalized_path();
        let child_path = if parent_path.is_empty() {
            name.trim().to_string()
        } else {
            format!("{}/{}", parent_path, name.trim())
        };
        self.find_by_path(&child_path)
    }

    /// Counts file entries reachable from `listing`.
    ///
    /// Subdirectories without a listing of their own contribute zero. Child
    /// paths are strictly longer than their parent and entry names cannot
    /// contain separators, so the walk always terminates.
    pub fn count_files(&self, listing: &DirListing) -> usize {
        let direct = listing.files().count();
        let nested: usize = listing
            .directories()
            .map(|entry| {
                self.child_listing(listing, &entry.name)
                    .map(|child| self.count_files(child))
                    .unwrap_or(0)
            })
            .sum();
        direct + nested
    }

    /// One section per subdirectory of `listing`.
    pub fn build_sections_for_listing<S: AsRef<str>>(
        &self,
        listing: &DirListing,
        segments: &[S],
    ) -> Vec<DownloadSection> {
        let base = segments
            .iter()
            .map(|segment| segment.as_ref())
            .collect::<Vec<_>>()
            .join("/");

        listing
            .directories()
            .map(|entry| {
                let name = entry.name.trim();
                let count = self
                    .child_listing(listing, name)
                    .map(|child| self.count_files(child))
                    .unwrap_or(0);
                let href = if base.is_empty() {
                    format!("/download/{}/", name)
                } else {
                    format!("/download/{}/{}/", base, name)
                };
                DownloadSection {
                    key: name.to_string(),
                    title: format_segment_label(name),
                    href,
                    count,
                    last_modified: entry.last_modified.clone(),
                }
            })
            .collect()
    }

    /// Builds the category → sections map for the whole mirror.
    ///
    /// Categories follow the order of the root listing's directory entries.
    /// A category that holds files but no subdirectories is presented as a
    /// single section pointing at itself.
    pub fn build_download_sections(&self) -> DownloadSections {
        let Some(root) = self.find_listing::<&str>(&[]) else {
            return DownloadSections::default();
        };

        let categories = root
            .directories()
            .map(|entry| {
                let key = entry.name.trim().to_string();
                let sections = match self.child_listing(root, &key) {
                    Some(listing) => {
                        let mut sections = self.build_sections_for_listing(listing, &[&key]);
                        if sections.is_empty() && listing.files().next().is_some() {
                            sections.push(DownloadSection {
                                key: key.clone(),
                                title: format_segment_label(&key),
                                href: format!("/download/{}/", key),
                                count: self.count_files(listing),
                                last_modified: listing
                                    .latest_modified()
                                    .map(str::to_string)
                                    .or_else(|| entry.last_modified.clone()),
                            });
                        }
                        sections
                    }
                    None => Vec::new(),
                };
                DownloadCategory {
                    title: format_segment_label(&key),
                    key,
                    sections,
                }
            })
            .collect();

        DownloadSections(categories)
    }

    /// Landing page figures: top-level directories, collections and files.
    pub fn summary(&self, sections: &DownloadSections) -> DownloadSummary {
        let Some(root) = self.find_listing::<&str>(&[]) else {
            return DownloadSummary::default();
        };

        let mut top_level_count = 0;
        let mut total_files = 0;
        for entry in root.directories() {
            top_level_count += 1;
            total_files += self
                .child_listing(root, &entry.name)
                .map(|listing| self.count_files(listing))
                .unwrap_or(0);
        }

        DownloadSummary {
            top_level_count,
            total_collections: sections.total_collections(),
            total_files,
        }
    }

    /// Builds the listing page for `segments`, or `None` if no listing exists.
    pub fn listing_page(&self, segments: &[String], remote_base: &str) -> Option<ListingPage> {
        if segments.is_empty() {
            return None;
        }
        let listing = self.find_listing(segments)?;

        let file_listing = DirListing::new(
            listing.path.clone(),
            listing.files().cloned().collect(),
        );
        let title = segments
            .last()
            .map(|segment| format_segment_label(segment))
            .unwrap_or_default();
        let remote_path = format!(
            "{}/{}",
            remote_base.trim_end_matches('/'),
            listing.path.trim_start_matches('/')
        );

        Some(ListingPage {
            segments: segments.to_vec(),
            title,
            subdirectory_sections: self.build_sections_for_listing(listing, segments),
            file_listing,
            total_files: self.count_files(listing),
            latest_modified: listing.latest_modified().map(str::to_string),
            relative_path: segments.join("/"),
            remote_path,
        })
    }

    /// A new index restricted to listings at or below `prefix`.
    ///
    /// The root of the scoped index is synthesized so that `prefix` becomes
    /// its single category.
    pub fn scoped(&self, prefix: &str) -> DownloadIndex {
        let prefix = normalize_path(prefix);
        if prefix.is_empty() {
            return self.clone();
        }
        let nested = format!("{}/", prefix);
        let mut listings: Vec<DirListing> = self
            .listings
            .iter()
            .filter(|listing| {
                let path = listing.normalized_path();
                path == prefix || path.starts_with(&nested)
            })
            .cloned()
            .collect();
        if listings.is_empty() {
            return DownloadIndex::default();
        }

        // A multi-segment prefix still needs a root that leads to it.
        let segments: Vec<&str> = prefix.split('/').collect();
        for depth in (0..segments.len()).rev() {
            let parent = segments[..depth].join("/");
            let child = segments[depth];
            listings.push(DirListing::new(
                parent,
                vec![super::model::DirEntry::dir(child)],
            ));
        }
        DownloadIndex::new(listings)
    }

    /// Every listing path, trimmed, de-duplicated and sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .listings
            .iter()
            .map(|listing| listing.normalized_path())
            .filter(|path| !path.is_empty())
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }
}
