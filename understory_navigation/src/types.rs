// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for navigation: context ids, contexts, edges, paths, and errors.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::ops::Deref;

use understory_tool_id::ToolId;

/// Identifier of a context (a screen, tab, dialog, or mode of the host UI).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(Arc<str>);

impl ContextId {
    /// Create an id from any string-like value.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextId({:?})", &*self.0)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContextId {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl From<String> for ContextId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&Self> for ContextId {
    fn from(id: &Self) -> Self {
        id.clone()
    }
}

impl Deref for ContextId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ContextId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for ContextId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// A registered context.
///
/// Contexts form a forest through their optional parent. The tool list holds
/// the tools believed to be available while the context is active, in the
/// order they were added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    pub(crate) id: ContextId,
    pub(crate) name: String,
    pub(crate) parent: Option<ContextId>,
    pub(crate) children: Vec<ContextId>,
    pub(crate) tools: Vec<ToolId>,
}

impl Context {
    pub(crate) fn new(id: ContextId, name: String, parent: Option<ContextId>) -> Self {
        Self {
            id,
            name,
            parent,
            children: Vec::new(),
            tools: Vec::new(),
        }
    }

    /// Context identifier.
    pub fn id(&self) -> &ContextId {
        &self.id
    }

    /// Human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent context, if any.
    ///
    /// The parent may have been removed since; see
    /// [`NavigationPlanner::remove_context`](crate::NavigationPlanner::remove_context).
    pub fn parent(&self) -> Option<&ContextId> {
        self.parent.as_ref()
    }

    /// Child contexts in registration order.
    pub fn children(&self) -> &[ContextId] {
        &self.children
    }

    /// Tools available while this context is active.
    pub fn tools(&self) -> &[ToolId] {
        &self.tools
    }

    /// Returns true if `tool` belongs to this context.
    pub fn has_tool(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t.as_str() == tool)
    }
}

/// A directed transition between two contexts performed by invoking a tool.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationEdge {
    /// Source context.
    pub from: ContextId,
    /// Destination context.
    pub to: ContextId,
    /// Tool whose invocation performs the transition.
    pub tool: ToolId,
    /// Positive, finite cost of taking this edge.
    pub weight: f64,
}

/// Default edge weight.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A computed route between two contexts.
///
/// Steps are in the order they must be taken. No context appears twice.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationPath {
    /// Origin context.
    pub from: ContextId,
    /// Destination context.
    pub to: ContextId,
    /// Edges to follow, origin first.
    pub steps: Vec<NavigationEdge>,
    /// Sum of the step weights.
    pub total_weight: f64,
}

impl NavigationPath {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true when origin and destination coincide.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Tools to invoke, in order.
    pub fn tools(&self) -> impl Iterator<Item = &ToolId> + '_ {
        self.steps.iter().map(|s| &s.tool)
    }

    /// Contexts visited, origin and destination included.
    pub fn contexts(&self) -> Vec<&ContextId> {
        let mut out = Vec::with_capacity(self.steps.len() + 1);
        out.push(&self.from);
        out.extend(self.steps.iter().map(|s| &s.to));
        out
    }
}

/// Notification that the current context changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextChange {
    /// The previous current context, if one was set.
    pub previous: Option<ContextId>,
    /// The new current context.
    pub current: ContextId,
}

/// Handle returned by [`NavigationPlanner::subscribe`](crate::NavigationPlanner::subscribe).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Errors surfaced by [`NavigationPlanner`](crate::NavigationPlanner) calls.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum NavigationError {
    /// The context is not registered (or has been removed).
    #[error("context `{0}` is not registered")]
    UnknownContext(ContextId),
    /// The context is already registered under a different parent.
    #[error("context `{0}` is already registered with a different parent")]
    DuplicateContext(ContextId),
    /// Edge weights must be finite and strictly positive.
    #[error("invalid edge weight {0}; weights must be finite and greater than zero")]
    InvalidWeight(f64),
    /// The destination cannot be reached from the origin.
    #[error("no path from `{from}` to `{to}`")]
    NoPathFound {
        /// Origin context.
        from: ContextId,
        /// Unreachable destination.
        to: ContextId,
    },
    /// No context containing the tool is reachable from the origin.
    #[error("no context containing tool `{tool}` is reachable from `{from}`")]
    ToolUnreachable {
        /// Origin context.
        from: ContextId,
        /// Requested tool.
        tool: ToolId,
    },
    /// No current context has been set.
    #[error("no current context is set")]
    NoCurrentContext,
}
