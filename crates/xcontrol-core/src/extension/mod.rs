//! Dashboard extensions (user-center style panels).
//!
//! # Module Structure
//!
//! - `model`: `DashboardExtension`, `ExtensionRoute` and access decisions
//! - `registry`: `ExtensionRegistry` and the builtin user center

mod model;
mod registry;

pub use model::{AccessDecision, DashboardExtension, ExtensionRoute};
pub use registry::{
    user_center_extension, ExtensionRegistry, ResolvedRoute, PANEL_BASE_PATH,
    USER_CENTER_EXTENSION,
};
