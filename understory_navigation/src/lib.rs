// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_navigation --heading-base-level=0

//! Understory Navigation: plan how to get from the current UI context to a tool.
//!
//! ## Overview
//!
//! A UI is modelled as a directed graph of contexts (screens, tabs, dialogs, modes). An edge
//! `from → to` says that invoking a tool in `from` leads to `to`, at some positive cost. Each
//! context lists the tools that become available while it is active.
//!
//! [`NavigationPlanner`] keeps that registry and answers:
//! - [`NavigationPlanner::compute_path`]: the cheapest route between two contexts,
//! - [`NavigationPlanner::plan_to_tool`]: the cheapest route from the current context to any
//!   context that contains a tool,
//! - [`NavigationPlanner::find_context_for_tool`]: where a tool lives.
//!
//! Routes never revisit a context, and the result depends only on registration order, never on
//! hash iteration order.
//!
//! The planner performs no inference. The [`discovery`] module has helpers that derive context
//! and membership registrations from tool naming, render-tree ancestry, or mount notifications.
//!
//! ## Example
//!
//! ```rust
//! use understory_navigation::NavigationPlanner;
//!
//! let mut planner = NavigationPlanner::new();
//! planner.register_context("dashboard", "Dashboard", None).unwrap();
//! planner
//!     .register_context("dashboard.security", "Security", Some("dashboard"))
//!     .unwrap();
//! planner
//!     .register_edge("dashboard", "dashboard.security", "tab-security")
//!     .unwrap();
//! planner
//!     .register_tool_in_context("enable-2fa", "dashboard.security")
//!     .unwrap();
//! planner.set_current_context("dashboard").unwrap();
//!
//! let path = planner.plan_to_tool("enable-2fa").unwrap();
//! let tools: Vec<&str> = path.tools().map(|t| t.as_str()).collect();
//! assert_eq!(tools, ["tab-security"]);
//! assert_eq!(path.total_weight, 1.0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod discovery;
mod path;
mod planner;
pub mod types;

pub use discovery::{
    BoundaryObserver, ContextAncestry, NamingConvention, enclosing_context, register_from_ancestry,
};
pub use planner::NavigationPlanner;
pub use types::{
    Context, ContextChange, ContextId, DEFAULT_WEIGHT, NavigationEdge, NavigationError,
    NavigationPath, SubscriptionId,
};
pub use understory_tool_id::ToolId;
