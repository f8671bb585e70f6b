// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The session: one tracker and one planner, owned together.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, MutexGuard};
use understory_exposure::{ExposureTracker, ToolId};
use understory_navigation::{NavigationPath, NavigationPlanner};

use crate::config::ReachConfig;
use crate::error::{ConfigError, InvokeError, ReachError};

/// Host hook that performs a tool's action, e.g. clicks the button behind it.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Invoke `tool`. Resolves once the host has dispatched the action.
    async fn invoke(&self, tool: &ToolId) -> Result<(), InvokeError>;
}

/// A tracker and a planner sharing one lifetime.
///
/// Cloning is cheap and yields another handle to the same state, so the host's
/// signal handlers and the controller can each hold one.
pub struct Session<H> {
    tracker: ExposureTracker<H>,
    planner: Arc<Mutex<NavigationPlanner>>,
    config: Arc<ReachConfig>,
}

impl<H> Clone for Session<H> {
    fn clone(&self) -> Self {
        Self {
            tracker: self.tracker.clone(),
            planner: Arc::clone(&self.planner),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H> core::fmt::Debug for Session<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("tracker", &self.tracker)
            .field("planner", &*self.planner.lock())
            .field("config", &self.config)
            .finish()
    }
}

impl<H> Default for Session<H> {
    fn default() -> Self {
        Self::with_parts(ReachConfig::default())
    }
}

impl<H> Session<H> {
    /// Create a session after validating `config`.
    pub fn new(config: ReachConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_parts(config))
    }

    fn with_parts(config: ReachConfig) -> Self {
        Self {
            tracker: ExposureTracker::new(),
            planner: Arc::new(Mutex::new(NavigationPlanner::new())),
            config: Arc::new(config),
        }
    }

    /// The exposure tracker.
    pub fn tracker(&self) -> &ExposureTracker<H> {
        &self.tracker
    }

    /// Lock the planner.
    ///
    /// Do not hold the guard across an `.await`.
    pub fn planner(&self) -> MutexGuard<'_, NavigationPlanner> {
        self.planner.lock()
    }

    /// The configuration this session was built with.
    pub fn config(&self) -> &ReachConfig {
        &self.config
    }

    /// Tear down: unregister every element (failing their waiters) and forget
    /// every context, edge, and listener.
    pub fn shutdown(&self) {
        self.tracker.clear();
        self.planner.lock().clear();
        tracing::info!("session shut down");
    }
}

impl<H: Send + 'static> Session<H> {
    /// Wait until `tool` satisfies the configured ready state.
    pub async fn wait_ready(&self, tool: &str, timeout: Duration) -> Result<(), ReachError> {
        let required = self.config.ready_state;
        let wait = self.tracker.wait_for_state(tool, required, timeout)?;
        if wait.await {
            return Ok(());
        }
        let last = self.tracker.state(tool).ok();
        tracing::warn!(tool, ?required, ?last, ?timeout, "tool not ready");
        Err(ReachError::NotReady {
            tool: ToolId::from(tool),
            required,
            last,
            timeout,
        })
    }

    /// Navigate from the current context to one containing `tool` and wait for
    /// `tool` to become ready.
    ///
    /// Each navigation tool on the route is awaited with the step timeout,
    /// invoked, and its destination made current. Returns the route taken.
    pub async fn reach(
        &self,
        tool: &str,
        invoker: &dyn ToolInvoker,
    ) -> Result<NavigationPath, ReachError> {
        let path = self.planner.lock().plan_to_tool(tool)?;
        tracing::debug!(tool, from = %path.from, to = %path.to, steps = path.len(), "route planned");
        for step in &path.steps {
            self.wait_ready(&step.tool, self.config.step_timeout())
                .await?;
            invoker
                .invoke(&step.tool)
                .await
                .map_err(|source| ReachError::Invocation {
                    tool: step.tool.clone(),
                    source,
                })?;
            self.planner.lock().set_current_context(&step.to)?;
            tracing::debug!(tool = %step.tool, context = %step.to, "step taken");
        }
        self.wait_ready(tool, self.config.wait_timeout()).await?;
        Ok(path)
    }

    /// [`reach`](Self::reach) `tool`, then invoke it.
    pub async fn invoke(
        &self,
        tool: &str,
        invoker: &dyn ToolInvoker,
    ) -> Result<NavigationPath, ReachError> {
        let path = self.reach(tool, invoker).await?;
        let id = ToolId::from(tool);
        invoker
            .invoke(&id)
            .await
            .map_err(|source| ReachError::Invocation { tool: id, source })?;
        tracing::info!(tool, steps = path.len(), "tool invoked");
        Ok(path)
    }
}
