// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Planner implementation: context registry, edges, memberships, and path queries.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use understory_tool_id::ToolId;

use crate::path::Graph;
use crate::types::{
    Context, ContextChange, ContextId, DEFAULT_WEIGHT, NavigationEdge, NavigationError,
    NavigationPath, SubscriptionId,
};

type Listener = Box<dyn FnMut(&ContextChange) + Send>;

/// Registry of contexts and the tool-driven transitions between them.
///
/// ## Usage
///
/// - The host (or a helper such as [`NamingConvention`](crate::NamingConvention)) registers contexts with
///   [`register_context`](Self::register_context), transitions with
///   [`register_edge`](Self::register_edge), and tool placement with
///   [`register_tool_in_context`](Self::register_tool_in_context).
/// - The host reports the live context with [`set_current_context`](Self::set_current_context).
/// - Controllers ask for routes with [`compute_path`](Self::compute_path) or
///   [`plan_to_tool`](Self::plan_to_tool).
///
/// All queries are deterministic: iteration follows registration order.
pub struct NavigationPlanner {
    contexts: HashMap<ContextId, Context>,
    // Live contexts in registration order.
    order: Vec<ContextId>,
    edges: Vec<NavigationEdge>,
    current: Option<ContextId>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl core::fmt::Debug for NavigationPlanner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NavigationPlanner")
            .field("contexts", &self.order)
            .field("edges", &self.edges.len())
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for NavigationPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationPlanner {
    /// Create an empty planner.
    pub fn new() -> Self {
        Self {
            contexts: HashMap::new(),
            order: Vec::new(),
            edges: Vec::new(),
            current: None,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Register a context, optionally as a child of `parent`.
    ///
    /// Re-registering an id with the same parent is a no-op; with a different
    /// parent it fails with [`NavigationError::DuplicateContext`]. The parent must
    /// already be registered.
    pub fn register_context(
        &mut self,
        id: impl Into<ContextId>,
        name: impl Into<String>,
        parent: Option<&str>,
    ) -> Result<(), NavigationError> {
        let id = id.into();
        if let Some(existing) = self.contexts.get(id.as_str()) {
            if existing.parent.as_deref() == parent {
                return Ok(());
            }
            tracing::warn!(context = %id, "context re-registered with a different parent");
            return Err(NavigationError::DuplicateContext(id));
        }
        let parent = match parent {
            Some(p) => Some(self.live(p)?.id.clone()),
            None => None,
        };
        if let Some(p) = &parent
            && let Some(parent_ctx) = self.contexts.get_mut(p.as_str())
        {
            parent_ctx.children.push(id.clone());
        }
        tracing::debug!(context = %id, parent = ?parent, "context registered");
        self.order.push(id.clone());
        self.contexts
            .insert(id.clone(), Context::new(id, name.into(), parent));
        Ok(())
    }

    /// Remove a context.
    ///
    /// The context is unlinked from its parent's children. Edges that touch it,
    /// children that name it as parent, and a current context equal to it are
    /// left in place; they surface [`NavigationError::UnknownContext`] on next use.
    pub fn remove_context(&mut self, id: &str) -> Result<Context, NavigationError> {
        let removed = self
            .contexts
            .remove(id)
            .ok_or_else(|| NavigationError::UnknownContext(ContextId::from(id)))?;
        self.order.retain(|c| c.as_str() != id);
        if let Some(parent) = removed
            .parent
            .as_ref()
            .and_then(|p| self.contexts.get_mut(p.as_str()))
        {
            parent.children.retain(|c| c.as_str() != id);
        }
        tracing::debug!(context = id, "context removed");
        Ok(removed)
    }

    /// Register a transition `from → to` performed by `tool`, with weight 1.
    pub fn register_edge(
        &mut self,
        from: &str,
        to: &str,
        tool: impl Into<ToolId>,
    ) -> Result<(), NavigationError> {
        self.register_edge_weighted(from, to, tool, DEFAULT_WEIGHT)
    }

    /// Register a weighted transition `from → to` performed by `tool`.
    ///
    /// Both endpoints must be registered and `weight` must be finite and
    /// greater than zero. Several edges may connect the same pair of contexts;
    /// registering the same `(from, to, tool)` again updates its weight.
    pub fn register_edge_weighted(
        &mut self,
        from: &str,
        to: &str,
        tool: impl Into<ToolId>,
        weight: f64,
    ) -> Result<(), NavigationError> {
        let from = self.live(from)?.id.clone();
        let to = self.live(to)?.id.clone();
        if !(weight.is_finite() && weight > 0.0) {
            return Err(NavigationError::InvalidWeight(weight));
        }
        let tool = tool.into();
        if let Some(existing) = self
            .edges
            .iter_mut()
            .find(|e| e.from == from && e.to == to && e.tool == tool)
        {
            existing.weight = weight;
            return Ok(());
        }
        tracing::debug!(%from, %to, %tool, weight, "edge registered");
        self.edges.push(NavigationEdge {
            from,
            to,
            tool,
            weight,
        });
        Ok(())
    }

    /// Remove the edge `from → to` performed by `tool`. Returns true if it existed.
    pub fn remove_edge(&mut self, from: &str, to: &str, tool: &str) -> bool {
        let before = self.edges.len();
        self.edges
            .retain(|e| !(e.from.as_str() == from && e.to.as_str() == to && e.tool.as_str() == tool));
        before != self.edges.len()
    }

    /// Declare that `tool` is available while `context` is active.
    ///
    /// A tool may belong to several contexts. Adding it twice is a no-op.
    pub fn register_tool_in_context(
        &mut self,
        tool: impl Into<ToolId>,
        context: &str,
    ) -> Result<(), NavigationError> {
        let tool = tool.into();
        let ctx = self
            .contexts
            .get_mut(context)
            .ok_or_else(|| NavigationError::UnknownContext(ContextId::from(context)))?;
        if !ctx.has_tool(&tool) {
            tracing::debug!(%tool, context, "tool placed in context");
            ctx.tools.push(tool);
        }
        Ok(())
    }

    /// Withdraw `tool` from `context`. Returns true if it was a member.
    pub fn remove_tool_from_context(
        &mut self,
        tool: &str,
        context: &str,
    ) -> Result<bool, NavigationError> {
        let ctx = self
            .contexts
            .get_mut(context)
            .ok_or_else(|| NavigationError::UnknownContext(ContextId::from(context)))?;
        let before = ctx.tools.len();
        ctx.tools.retain(|t| t.as_str() != tool);
        Ok(before != ctx.tools.len())
    }

    /// Set the live context and notify listeners if it changed.
    pub fn set_current_context(&mut self, id: &str) -> Result<(), NavigationError> {
        let id = self.live(id)?.id.clone();
        if self.current.as_ref() == Some(&id) {
            return Ok(());
        }
        let previous = self.current.replace(id.clone());
        tracing::debug!(current = %id, ?previous, "current context changed");
        let change = ContextChange {
            previous,
            current: id,
        };
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
        Ok(())
    }

    /// The live context.
    ///
    /// Fails with [`NavigationError::NoCurrentContext`] if none was set, or with
    /// [`NavigationError::UnknownContext`] if it has been removed since.
    pub fn current_context(&self) -> Result<&ContextId, NavigationError> {
        let current = self
            .current
            .as_ref()
            .ok_or(NavigationError::NoCurrentContext)?;
        Ok(&self.live(current)?.id)
    }

    /// Cheapest loop-free route from `from` to `to`.
    ///
    /// `from == to` yields a zero-step path. Among equally cheap routes, parallel
    /// edges resolve to the earlier registered one, and otherwise the route whose
    /// last hop leaves the later settled context wins. The result depends only on
    /// registration order.
    pub fn compute_path(&self, from: &str, to: &str) -> Result<NavigationPath, NavigationError> {
        let from_id = self.live(from)?.id.clone();
        let to_id = self.live(to)?.id.clone();
        let graph = Graph::new(&self.order, &self.edges);
        let (Some(origin), Some(target)) = (graph.node(from), graph.node(to)) else {
            return Err(NavigationError::UnknownContext(from_id));
        };
        let route = graph
            .search(origin, |n| n == target)
            .ok_or_else(|| NavigationError::NoPathFound {
                from: from_id.clone(),
                to: to_id.clone(),
            })?;
        Ok(self.to_path(from_id, to_id, &route.edges, route.total_weight))
    }

    /// [`compute_path`](Self::compute_path) from the current context.
    pub fn compute_path_from_current(&self, to: &str) -> Result<NavigationPath, NavigationError> {
        let from = self.current_context()?.clone();
        self.compute_path(&from, to)
    }

    /// Cheapest route from the current context to any context containing `tool`.
    ///
    /// Zero steps if the current context already contains it. Among equally
    /// cheap destinations the earlier registered context wins.
    pub fn plan_to_tool(&self, tool: &str) -> Result<NavigationPath, NavigationError> {
        let from_id = self.current_context()?.clone();
        let graph = Graph::new(&self.order, &self.edges);
        let origin = graph
            .node(&from_id)
            .ok_or_else(|| NavigationError::UnknownContext(from_id.clone()))?;
        let route = graph
            .search(origin, |n| {
                self.contexts
                    .get(graph.id(n).as_str())
                    .is_some_and(|c| c.has_tool(tool))
            })
            .ok_or_else(|| NavigationError::ToolUnreachable {
                from: from_id.clone(),
                tool: ToolId::from(tool),
            })?;
        let to_id = graph.id(route.target).clone();
        Ok(self.to_path(from_id, to_id, &route.edges, route.total_weight))
    }

    /// Contexts containing `tool`, in registration order. Empty if none.
    pub fn find_context_for_tool(&self, tool: &str) -> Vec<ContextId> {
        self.order
            .iter()
            .filter(|id| {
                self.contexts
                    .get(id.as_str())
                    .is_some_and(|c| c.has_tool(tool))
            })
            .cloned()
            .collect()
    }

    /// Look up a live context.
    pub fn context(&self, id: &str) -> Option<&Context> {
        self.contexts.get(id)
    }

    /// Live contexts in registration order.
    pub fn contexts(&self) -> impl Iterator<Item = &Context> + '_ {
        self.order.iter().filter_map(|id| self.contexts.get(id.as_str()))
    }

    /// All registered edges in registration order, including ones that touch
    /// removed contexts.
    pub fn edges(&self) -> &[NavigationEdge] {
        &self.edges
    }

    /// Chain of live ancestors of `id`, nearest first.
    ///
    /// Stops at the first parent that is no longer registered.
    pub fn ancestors(&self, id: &str) -> Result<Vec<ContextId>, NavigationError> {
        let mut out = Vec::new();
        let mut cur = self.live(id)?;
        // Parents must exist at registration time, so the chain is acyclic.
        while let Some(parent) = cur.parent.as_ref().and_then(|p| self.contexts.get(p.as_str())) {
            out.push(parent.id.clone());
            cur = parent;
        }
        Ok(out)
    }

    /// Listen for current-context changes.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ContextChange) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Stop a listener. Idempotent; returns true if it was active.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        before != self.listeners.len()
    }

    /// Remove every context, edge, and listener, and clear the current context.
    pub fn clear(&mut self) {
        self.contexts.clear();
        self.order.clear();
        self.edges.clear();
        self.current = None;
        self.listeners.clear();
    }

    fn live(&self, id: &str) -> Result<&Context, NavigationError> {
        self.contexts
            .get(id)
            .ok_or_else(|| NavigationError::UnknownContext(ContextId::from(id)))
    }

    fn to_path(
        &self,
        from: ContextId,
        to: ContextId,
        edges: &[usize],
        total_weight: f64,
    ) -> NavigationPath {
        NavigationPath {
            from,
            to,
            steps: edges.iter().map(|&ei| self.edges[ei].clone()).collect(),
            total_weight,
        }
    }
}
