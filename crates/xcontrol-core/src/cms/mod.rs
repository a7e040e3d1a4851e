//! CMS composition layer.
//!
//! # Module Structure
//!
//! - `model`: `[cms]` configuration and content source metadata
//! - `page`: Component references and the composed page tree
//! - `registry`: Template/theme/extension registries built at startup
//! - `runtime`: Active selection resolution and layout/provider composition
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use xcontrol_core::cms::{CmsConfig, CmsRegistry, CmsRuntime, PageNode};
//!
//! let runtime = CmsRuntime::new(Arc::new(CmsRegistry::builtin()), CmsConfig::default());
//! let page = runtime.compose_page(PageNode::content("home"));
//! assert_eq!(page.outline().last().map(String::as_str), Some("home"));
//! ```

mod model;
mod page;
mod registry;
mod runtime;

pub use model::{
    CmsConfig, ContentConfig, ContentSourceConfig, ContentSourceMetadata, SourceType,
    APP_SHELL_EXTENSION, DEFAULT_TEMPLATE, DEFAULT_THEME, MARKDOWN_SYNC_EXTENSION,
};
pub use page::{ComponentRef, PageNode};
pub use registry::{CmsExtension, CmsRegistry, CmsRegistryBuilder, CmsTemplate, CmsTheme, HOME_PAGE};
pub use runtime::CmsRuntime;
