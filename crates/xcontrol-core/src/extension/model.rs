//! Dashboard extension model.

use crate::cms::ComponentRef;
use crate::session::{SessionUser, UserRole};
use serde::{Deserialize, Serialize};

/// A page contributed by a dashboard extension.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionRoute {
    pub slug: String,
    pub title: String,
    pub component: ComponentRef,
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_role: Option<UserRole>,
}

impl ExtensionRoute {
    pub fn new(slug: impl Into<String>, title: impl Into<String>, component: ComponentRef) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            component,
            requires_auth: false,
            minimum_role: None,
        }
    }

    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Implies [`Self::authenticated`].
    pub fn with_minimum_role(mut self, role: UserRole) -> Self {
        self.requires_auth = true;
        self.minimum_role = Some(role);
        self
    }

    /// Decides whether `user` may open this route.
    ///
    /// Guests count as signed out for routes that require authentication.
    pub fn check_access(&self, user: Option<&SessionUser>) -> AccessDecision {
        let role = user.map(|u| u.role).unwrap_or_default();
        if self.requires_auth && (user.is_none() || role == UserRole::Guest) {
            return AccessDecision::LoginRequired;
        }
        match self.minimum_role {
            Some(required) if role < required => AccessDecision::Forbidden { required },
            _ => AccessDecision::Allowed,
        }
    }
}

/// Outcome of [`ExtensionRoute::check_access`].
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum AccessDecision {
    Allowed,
    LoginRequired,
    Forbidden { required: UserRole },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// A plugin-like dashboard area mounted under `base_path`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardExtension {
    pub id: String,
    pub title: String,
    pub base_path: String,
    pub routes: Vec<ExtensionRoute>,
    /// Slug served for the bare base path. Defaults to the first route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_route: Option<String>,
}

impl DashboardExtension {
    pub fn new(id: impl Into<String>, title: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            base_path: base_path.into(),
            routes: Vec::new(),
            default_route: None,
        }
    }

    pub fn with_route(mut self, route: ExtensionRoute) -> Self {
        self.routes.push(route);
        self
    }

    pub fn with_default_route(mut self, slug: impl Into<String>) -> Self {
        self.default_route = Some(slug.into());
        self
    }

    pub fn route(&self, slug: &str) -> Option<&ExtensionRoute> {
        self.routes.iter().find(|route| route.slug == slug)
    }

    pub fn default_route(&self) -> Option<&ExtensionRoute> {
        match &self.default_route {
            Some(slug) => self.route(slug),
            None => self.routes.first(),
        }
    }

    /// Resolves a slug; empty or whitespace-only selects the default route.
    pub fn resolve(&self, slug: &str) -> Option<&ExtensionRoute> {
        let slug = slug.trim().trim_matches('/');
        if slug.is_empty() {
            self.default_route()
        } else {
            self.route(slug)
        }
    }

    /// Full href of a route, e.g. `/panel/user-center/account`.
    pub fn href(&self, route: &ExtensionRoute) -> String {
        format!("{}/{}", self.base_path.trim_end_matches('/'), route.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::normalize_user;
    use serde_json::json;

    fn user(role: &str) -> SessionUser {
        normalize_user(&json!({"id": "1", "email": "a@b.c", "role": role})).unwrap()
    }

    #[test]
    fn test_check_access() {
        let open = ExtensionRoute::new("about", "About", "About".into());
        assert!(open.check_access(None).is_allowed());

        let private = ExtensionRoute::new("account", "Account", "Account".into()).authenticated();
        assert_eq!(private.check_access(None), AccessDecision::LoginRequired);
        assert_eq!(private.check_access(Some(&user("nobody"))), AccessDecision::LoginRequired);
        assert!(private.check_access(Some(&user("user"))).is_allowed());

        let ops = ExtensionRoute::new("ops", "Ops", "Ops".into()).with_minimum_role(UserRole::Operator);
        assert_eq!(
            ops.check_access(Some(&user("member"))),
            AccessDecision::Forbidden { required: UserRole::Operator }
        );
        assert!(ops.check_access(Some(&user("operator"))).is_allowed());
        assert!(ops.check_access(Some(&user("admin"))).is_allowed());
    }

    #[test]
    fn test_resolve_default_and_explicit() {
        let extension = DashboardExtension::new("demo", "Demo", "/panel/demo/")
            .with_route(ExtensionRoute::new("a", "A", "A".into()))
            .with_route(ExtensionRoute::new("b", "B", "B".into()))
            .with_default_route("b");
        assert_eq!(extension.resolve("").map(|r| r.slug.as_str()), Some("b"));
        assert_eq!(extension.resolve(" /a/ ").map(|r| r.slug.as_str()), Some("a"));
        assert!(extension.resolve("zzz").is_none());
        let route = extension.route("a").unwrap();
        assert_eq!(extension.href(route), "/panel/demo/a");
    }
}
