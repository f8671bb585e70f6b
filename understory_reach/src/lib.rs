// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_reach --heading-base-level=0

//! Understory Reach: drive a UI to a tool and invoke it once it is ready.
//!
//! ## Overview
//!
//! A [`Session`] owns an [`ExposureTracker`] and a [`NavigationPlanner`] for the lifetime of
//! one host UI. The host feeds both (node registrations and signals to the tracker, contexts,
//! edges, and the current context to the planner). A controller then calls
//! [`Session::reach`] or [`Session::invoke`]:
//!
//! 1. plan the cheapest route from the current context to a context containing the tool,
//! 2. for each step, wait for the navigation tool to become ready, invoke it through the
//!    host's [`ToolInvoker`], and make the step's destination current,
//! 3. wait for the tool itself to become ready (and, for `invoke`, invoke it).
//!
//! "Ready" is [`ReachConfig::ready_state`], [`ExposureState::Interactable`] by default.
//! Timeouts come from [`ReachConfig`] and surface as [`ReachError::NotReady`].
//!
//! [`init_logging`] installs a `tracing` subscriber configured by [`LoggingConfig`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::{Arc, Weak};
//! use understory_reach::{InvokeError, ReachConfig, Session, Signal, ToolId, ToolInvoker};
//!
//! struct Host;
//!
//! #[async_trait::async_trait]
//! impl ToolInvoker for Host {
//!     async fn invoke(&self, _tool: &ToolId) -> Result<(), InvokeError> {
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let session: Session<Weak<()>> = Session::new(ReachConfig::default()).unwrap();
//! session.planner().register_context("home", "Home", None).unwrap();
//! session.planner().register_tool_in_context("save", "home").unwrap();
//! session.planner().set_current_context("home").unwrap();
//!
//! let node = Arc::new(());
//! session.tracker().register("save", Arc::downgrade(&node)).unwrap();
//! session.tracker().apply("save", Signal::Visibility { visible: true, obstructed: false });
//!
//! let path = session.invoke("save", &Host).await.unwrap();
//! assert!(path.is_empty());
//! # }
//! ```

mod config;
mod error;
pub mod logging;
mod session;

pub use config::ReachConfig;
pub use error::{ConfigError, InvokeError, ReachError};
pub use logging::{LogFormat, LoggingConfig, init_logging};
pub use session::{Session, ToolInvoker};

pub use understory_exposure::{ExposureState, ExposureTracker, Signal, ToolId};
pub use understory_navigation::{NavigationPath, NavigationPlanner};
