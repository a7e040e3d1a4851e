//! Registry of dashboard extensions.

use super::model::{DashboardExtension, ExtensionRoute};
use crate::cms::ComponentRef;
use std::collections::HashMap;

pub const USER_CENTER_EXTENSION: &str = "user-center";
pub const PANEL_BASE_PATH: &str = "/panel";

/// A route resolved inside its extension.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRoute<'a> {
    pub extension: &'a DashboardExtension,
    pub route: &'a ExtensionRoute,
}

impl ResolvedRoute<'_> {
    pub fn href(&self) -> String {
        self.extension.href(self.route)
    }
}

/// Extensions keyed by id, frozen after construction.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    extensions: HashMap<String, DashboardExtension>,
    order: Vec<String>,
}

impl ExtensionRegistry {
    /// Later registrations with the same id are ignored.
    pub fn new(extensions: impl IntoIterator<Item = DashboardExtension>) -> Self {
        let mut registry = Self::default();
        for extension in extensions {
            if registry.extensions.contains_key(&extension.id) {
                tracing::warn!("Duplicate dashboard extension '{}' ignored", extension.id);
                continue;
            }
            registry.order.push(extension.id.clone());
            registry.extensions.insert(extension.id.clone(), extension);
        }
        registry
    }

    /// Registry with the builtin user center.
    pub fn builtin() -> Self {
        Self::new([user_center_extension()])
    }

    pub fn get(&self, id: &str) -> Option<&DashboardExtension> {
        self.extensions.get(id)
    }

    /// Extensions in registration order.
    pub fn extensions(&self) -> Vec<&DashboardExtension> {
        self.order
            .iter()
            .filter_map(|id| self.extensions.get(id))
            .collect()
    }

    /// Resolves `/panel/<extension>/<slug>`. Unknown ids or slugs yield `None`.
    pub fn resolve(&self, extension_id: &str, slug: &str) -> Option<ResolvedRoute<'_>> {
        let extension = self.get(extension_id.trim())?;
        let route = extension.resolve(slug)?;
        tracing::debug!("Resolved panel route {}/{}", extension.id, route.slug);
        Some(ResolvedRoute { extension, route })
    }
}

/// The builtin account area: account (default), subscription and theme.
pub fn user_center_extension() -> DashboardExtension {
    let component = |name: &str| {
        ComponentRef::new(format!("extensions/builtin/{USER_CENTER_EXTENSION}/routes/{name}"))
    };
    DashboardExtension::new(
        USER_CENTER_EXTENSION,
        "User Center",
        format!("{PANEL_BASE_PATH}/{USER_CENTER_EXTENSION}"),
    )
    .with_route(ExtensionRoute::new("account", "Account", component("account")).authenticated())
    .with_route(
        ExtensionRoute::new("subscription", "Subscription", component("subscription"))
            .authenticated(),
    )
    .with_route(ExtensionRoute::new("theme", "Theme", component("theme")))
    .with_default_route("account")
}
