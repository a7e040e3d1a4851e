//! Prebuilt manifest module.
//!
//! # Module Structure
//!
//! - `template`: `TemplateManifest` and its queries
//! - `docs`: `DocEntry` and the empty fallback bodies
//! - `repository`: `ManifestRepository` trait

mod docs;
mod repository;
mod template;

pub use docs::{doc_entries, empty_docs_index, empty_downloads_index, DocEntry};
pub use repository::ManifestRepository;
pub use template::{TemplateInfo, TemplateManifest, EMPTY_MANIFEST_VERSION};
