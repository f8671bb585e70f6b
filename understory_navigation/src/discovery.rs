// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers that infer contexts and tool memberships for the planner.
//!
//! The planner itself never guesses. Each strategy here resolves final ids on the
//! host's behalf and then calls the ordinary registration methods:
//!
//! - [`NamingConvention`]: tool ids encode their context path, e.g.
//!   `dashboard.security.enable-2fa`.
//! - [`ContextAncestry`]: the host walks its own render tree to the nearest
//!   node that marks a context.
//! - [`BoundaryObserver`]: the host reports context boundaries as they mount and
//!   unmount, which drives the current context.

use alloc::string::String;
use alloc::vec::Vec;

use understory_tool_id::ToolId;

use crate::planner::NavigationPlanner;
use crate::types::{ContextId, NavigationError};

/// Infers the context chain of a tool from separators in its id.
///
/// With the default `.` separator, `dashboard.security.enable-2fa` resolves to
/// the context `dashboard.security`, child of `dashboard`. Context ids are the
/// prefixes of the tool id; context names are the last segment of each prefix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NamingConvention {
    /// Segment separator.
    pub separator: char,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self { separator: '.' }
    }
}

impl NamingConvention {
    /// A convention using `separator` between segments.
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    /// Context ids enclosing `tool`, outermost first.
    ///
    /// Returns `None` for ids without a context part or with empty segments.
    pub fn resolve(&self, tool: &str) -> Option<Vec<ContextId>> {
        let segments: Vec<&str> = tool.split(self.separator).collect();
        if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        let mut chain = Vec::with_capacity(segments.len() - 1);
        let mut end = 0;
        for segment in &segments[..segments.len() - 1] {
            if end > 0 {
                end += self.separator.len_utf8();
            }
            end += segment.len();
            chain.push(ContextId::from(&tool[..end]));
        }
        Some(chain)
    }

    /// Register the context chain of `tool` and place the tool in the innermost context.
    ///
    /// Already registered contexts are left as they are. Returns the innermost
    /// context, or `None` if the id does not follow the convention.
    pub fn apply(
        &self,
        planner: &mut NavigationPlanner,
        tool: impl Into<ToolId>,
    ) -> Result<Option<ContextId>, NavigationError> {
        let tool = tool.into();
        let Some(chain) = self.resolve(&tool) else {
            tracing::trace!(%tool, "tool id carries no context path");
            return Ok(None);
        };
        let mut parent: Option<&ContextId> = None;
        for id in &chain {
            let name = id
                .rsplit(self.separator)
                .next()
                .map(String::from)
                .unwrap_or_default();
            planner.register_context(id, name, parent.map(|p| p.as_str()))?;
            parent = Some(id);
        }
        let Some(leaf) = chain.last() else {
            return Ok(None);
        };
        planner.register_tool_in_context(tool, leaf)?;
        Ok(Some(leaf.clone()))
    }
}

/// Access to the host's render tree for context inference.
///
/// Implemented by the host over its own node type: a widget id, an index into
/// an arena, a weak pointer.
pub trait ContextAncestry {
    /// Node handle.
    type Node: Clone;

    /// Parent of `node`, or `None` at the root.
    fn parent_of(&self, node: &Self::Node) -> Option<Self::Node>;

    /// The context `node` marks, if it is a context boundary.
    fn context_marker(&self, node: &Self::Node) -> Option<ContextId>;
}

/// The nearest context marker at or above `node`.
pub fn enclosing_context<A: ContextAncestry + ?Sized>(tree: &A, node: &A::Node) -> Option<ContextId> {
    let mut cur = Some(node.clone());
    while let Some(n) = cur {
        if let Some(ctx) = tree.context_marker(&n) {
            return Some(ctx);
        }
        cur = tree.parent_of(&n);
    }
    None
}

/// Register every context marked at or above `node`, nested as in the tree,
/// and place `tool` in the nearest one.
///
/// Contexts already known to the planner keep their registration. Returns the
/// nearest context, or `None` when no ancestor carries a marker.
pub fn register_from_ancestry<A: ContextAncestry + ?Sized>(
    tree: &A,
    node: &A::Node,
    tool: impl Into<ToolId>,
    planner: &mut NavigationPlanner,
) -> Result<Option<ContextId>, NavigationError> {
    let mut markers = Vec::new();
    let mut cur = Some(node.clone());
    while let Some(n) = cur {
        if let Some(ctx) = tree.context_marker(&n) {
            markers.push(ctx);
        }
        cur = tree.parent_of(&n);
    }
    let mut parent: Option<ContextId> = None;
    for ctx in markers.iter().rev() {
        if planner.context(ctx).is_none() {
            planner.register_context(ctx, ctx.as_str(), parent.as_deref())?;
        }
        parent = Some(ctx.clone());
    }
    let Some(nearest) = markers.first() else {
        return Ok(None);
    };
    planner.register_tool_in_context(tool, nearest)?;
    Ok(Some(nearest.clone()))
}

/// Tracks mounted context boundaries and keeps the planner's current context
/// on the innermost one.
#[derive(Clone, Debug, Default)]
pub struct BoundaryObserver {
    stack: Vec<ContextId>,
}

impl BoundaryObserver {
    /// Create an observer with nothing mounted.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context boundary mounted.
    ///
    /// Unknown contexts are registered as children of the innermost mounted one.
    /// The entered context becomes current.
    pub fn enter(
        &mut self,
        planner: &mut NavigationPlanner,
        id: impl Into<ContextId>,
        name: impl Into<String>,
    ) -> Result<(), NavigationError> {
        let id = id.into();
        if planner.context(&id).is_none() {
            let parent = self.stack.last().map(|p| p.as_str());
            planner.register_context(&id, name, parent)?;
        }
        planner.set_current_context(&id)?;
        self.stack.push(id);
        Ok(())
    }

    /// A context boundary unmounted.
    ///
    /// The innermost remaining boundary becomes current. Returns false if `id`
    /// was not mounted. When nothing remains mounted the current context is left
    /// unchanged.
    pub fn leave(
        &mut self,
        planner: &mut NavigationPlanner,
        id: &str,
    ) -> Result<bool, NavigationError> {
        let Some(pos) = self.stack.iter().rposition(|c| c.as_str() == id) else {
            return Ok(false);
        };
        self.stack.remove(pos);
        if let Some(top) = self.stack.last() {
            planner.set_current_context(top)?;
        }
        Ok(true)
    }

    /// The innermost mounted context.
    pub fn active(&self) -> Option<&ContextId> {
        self.stack.last()
    }

    /// Mounted contexts, outermost first.
    pub fn mounted(&self) -> &[ContextId] {
        &self.stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use hashbrown::HashMap;

    #[test]
    fn naming_convention_resolves_prefixes() {
        let naming = NamingConvention::default();
        assert_eq!(
            naming.resolve("dashboard.security.enable-2fa"),
            Some(vec![
                ContextId::from("dashboard"),
                ContextId::from("dashboard.security")
            ])
        );
        assert_eq!(naming.resolve("save"), None);
        assert_eq!(naming.resolve("dashboard..save"), None);
        assert_eq!(naming.resolve(".save"), None);
        assert_eq!(naming.resolve("dashboard."), None);
    }

    #[test]
    fn naming_convention_with_wide_separator() {
        let naming = NamingConvention::new('→');
        assert_eq!(
            naming.resolve("a→b→tool"),
            Some(vec![ContextId::from("a"), ContextId::from("a→b")])
        );
    }

    #[test]
    fn naming_convention_registers_chain() {
        let mut planner = NavigationPlanner::new();
        let naming = NamingConvention::default();
        let leaf = naming
            .apply(&mut planner, "dashboard.security.enable-2fa")
            .unwrap();
        assert_eq!(leaf, Some(ContextId::from("dashboard.security")));
        naming
            .apply(&mut planner, "dashboard.security.change-password")
            .unwrap();

        let security = planner.context("dashboard.security").unwrap();
        assert_eq!(security.name(), "security");
        assert_eq!(security.parent(), Some(&ContextId::from("dashboard")));
        assert_eq!(security.tools().len(), 2);
        assert_eq!(planner.context("dashboard").unwrap().children().len(), 1);
        assert_eq!(
            planner.find_context_for_tool("dashboard.security.enable-2fa"),
            vec![ContextId::from("dashboard.security")]
        );
        assert_eq!(naming.apply(&mut planner, "plain").unwrap(), None);
    }

    struct Tree {
        parents: HashMap<u32, u32>,
        markers: HashMap<u32, &'static str>,
    }

    impl ContextAncestry for Tree {
        type Node = u32;

        fn parent_of(&self, node: &u32) -> Option<u32> {
            self.parents.get(node).copied()
        }

        fn context_marker(&self, node: &u32) -> Option<ContextId> {
            self.markers.get(node).map(|m| ContextId::from(*m))
        }
    }

    // 0 (app) ─ 1 ─ 2 (settings) ─ 3 ─ 4 (button)
    fn tree() -> Tree {
        Tree {
            parents: [(1, 0), (2, 1), (3, 2), (4, 3)].into_iter().collect(),
            markers: [(0, "app"), (2, "settings")].into_iter().collect(),
        }
    }

    #[test]
    fn enclosing_context_walks_up() {
        let tree = tree();
        assert_eq!(enclosing_context(&tree, &4), Some(ContextId::from("settings")));
        assert_eq!(enclosing_context(&tree, &2), Some(ContextId::from("settings")));
        assert_eq!(enclosing_context(&tree, &1), Some(ContextId::from("app")));
        assert_eq!(enclosing_context(&tree, &99), None);
    }

    #[test]
    fn ancestry_registers_nested_contexts() {
        let tree = tree();
        let mut planner = NavigationPlanner::new();
        let found = register_from_ancestry(&tree, &4, "save", &mut planner).unwrap();
        assert_eq!(found, Some(ContextId::from("settings")));
        assert_eq!(
            planner.ancestors("settings").unwrap(),
            vec![ContextId::from("app")]
        );
        assert!(planner.context("settings").unwrap().has_tool("save"));
        assert_eq!(
            register_from_ancestry(&tree, &99, "lost", &mut planner).unwrap(),
            None
        );
    }

    #[test]
    fn boundaries_drive_current_context() {
        let mut planner = NavigationPlanner::new();
        let mut observer = BoundaryObserver::new();
        observer.enter(&mut planner, "page", "Page").unwrap();
        observer.enter(&mut planner, "dialog", "Dialog").unwrap();
        assert_eq!(planner.current_context().unwrap(), &ContextId::from("dialog"));
        assert_eq!(
            planner.context("dialog").unwrap().parent(),
            Some(&ContextId::from("page"))
        );

        assert!(observer.leave(&mut planner, "dialog").unwrap());
        assert_eq!(planner.current_context().unwrap(), &ContextId::from("page"));
        assert!(!observer.leave(&mut planner, "dialog").unwrap());

        // Re-entering a known context keeps its registration.
        observer.enter(&mut planner, "dialog", "Renamed").unwrap();
        assert_eq!(planner.context("dialog").unwrap().name(), "Dialog");
        assert_eq!(observer.mounted().len(), 2);

        observer.leave(&mut planner, "page").unwrap();
        observer.leave(&mut planner, "dialog").unwrap();
        assert!(observer.active().is_none());
        assert_eq!(planner.current_context().unwrap(), &ContextId::from("dialog"));
    }
}
