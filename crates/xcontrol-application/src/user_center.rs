//! User-center panel routing.

use serde::Serialize;
use xcontrol_core::cms::ComponentRef;
use xcontrol_core::extension::{AccessDecision, ExtensionRegistry};
use xcontrol_core::session::SessionUser;

/// A resolved panel route and whether the current user may open it.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PanelRoute {
    pub extension: String,
    pub extension_title: String,
    pub slug: String,
    pub title: String,
    pub component: ComponentRef,
    pub href: String,
    pub access: AccessDecision,
}

/// One entry of an extension's navigation.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PanelLink {
    pub slug: String,
    pub title: String,
    pub href: String,
    pub requires_auth: bool,
}

pub struct UserCenterService {
    registry: ExtensionRegistry,
}

impl UserCenterService {
    pub fn new(registry: ExtensionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Resolves `/panel/<extension>/<slug>`; `None` when either is unknown.
    pub fn resolve(
        &self,
        extension_id: &str,
        slug: &str,
        user: Option<&SessionUser>,
    ) -> Option<PanelRoute> {
        let resolved = self.registry.resolve(extension_id, slug)?;
        let access = resolved.route.check_access(user);
        if !access.is_allowed() {
            tracing::debug!(
                "Panel route {} denied for role {}",
                resolved.href(),
                user.map(|u| u.role.as_str()).unwrap_or("anonymous")
            );
        }
        Some(PanelRoute {
            extension: resolved.extension.id.clone(),
            extension_title: resolved.extension.title.clone(),
            slug: resolved.route.slug.clone(),
            title: resolved.route.title.clone(),
            component: resolved.route.component.clone(),
            href: resolved.href(),
            access,
        })
    }

    /// Routes of an extension the user may open, in declaration order.
    pub fn navigation(&self, extension_id: &str, user: Option<&SessionUser>) -> Option<Vec<PanelLink>> {
        let extension = self.registry.get(extension_id)?;
        Some(
            extension
                .routes
                .iter()
                .filter(|route| route.check_access(user).is_allowed())
                .map(|route| PanelLink {
                    slug: route.slug.clone(),
                    title: route.title.clone(),
                    href: extension.href(route),
                    requires_auth: route.requires_auth,
                })
                .collect(),
        )
    }
}
