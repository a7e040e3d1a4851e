//! Page tree produced by the composition runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a renderable component (e.g. `extensions/app-shell/AppShellLayout`).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ComponentRef(String);

impl ComponentRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A node of the composed page.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PageNode {
    /// Page content rendered by the route itself.
    Content { id: String },
    /// A wrapper component (layout, provider) around a subtree.
    Component {
        component: ComponentRef,
        children: Box<PageNode>,
    },
    /// Content that must not be wrapped in the app shell.
    AppShellBypass { children: Box<PageNode> },
}

impl PageNode {
    pub fn content(id: impl Into<String>) -> Self {
        Self::Content { id: id.into() }
    }

    pub fn wrap(component: ComponentRef, children: PageNode) -> Self {
        Self::Component {
            component,
            children: Box::new(children),
        }
    }

    pub fn bypass_app_shell(children: PageNode) -> Self {
        Self::AppShellBypass {
            children: Box::new(children),
        }
    }

    /// Wrapper components from outermost to innermost, then the content id.
    pub fn outline(&self) -> Vec<String> {
        let mut outline = Vec::new();
        let mut node = self;
        loop {
            match node {
                PageNode::Content { id } => {
                    outline.push(id.clone());
                    return outline;
                }
                PageNode::Component {
                    component,
                    children,
                } => {
                    outline.push(component.to_string());
                    node = children.as_ref();
                }
                PageNode::AppShellBypass { children } => node = children.as_ref(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_walks_outer_to_inner() {
        let tree = PageNode::wrap(
            "Outer".into(),
            PageNode::bypass_app_shell(PageNode::wrap("Inner".into(), PageNode::content("home"))),
        );
        assert_eq!(tree.outline(), vec!["Outer", "Inner", "home"]);
    }

    #[test]
    fn test_page_node_serializes_with_kind_tag() {
        let tree = PageNode::wrap("Layout".into(), PageNode::content("home"));
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["kind"], "component");
        assert_eq!(json["component"], "Layout");
        assert_eq!(json["children"]["kind"], "content");
        assert_eq!(json["children"]["id"], "home");
    }
}
