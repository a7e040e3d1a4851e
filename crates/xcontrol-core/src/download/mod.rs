//! Download center domain module.
//!
//! # Module Structure
//!
//! - `model`: Manifest entities (`DirListing`, `DirEntry`) and page view models
//! - `index`: `DownloadIndex`, the section builder and recursive file counter
//! - `repository`: Repository trait for loading manifests

mod index;
mod model;
mod repository;

pub use index::{DownloadIndex, DEFAULT_REMOTE_BASE};
pub use model::{
    format_segment_label, normalize_path, parse_segments, DirEntry, DirListing, DownloadCategory,
    DownloadSection, DownloadSections, DownloadSummary, EntryType, ListingPage,
};
pub use repository::DownloadListingRepository;
