// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for sessions and configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use understory_exposure::{ExposureError, ExposureState, ToolId};
use understory_navigation::NavigationError;

/// Error reported by a [`ToolInvoker`](crate::ToolInvoker).
pub type InvokeError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of [`Session::reach`](crate::Session::reach) and
/// [`Session::invoke`](crate::Session::invoke).
#[derive(Debug, Error)]
pub enum ReachError {
    /// Planning or context bookkeeping failed.
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    /// A tool on the route is not tracked.
    #[error(transparent)]
    Exposure(#[from] ExposureError),
    /// A tool did not reach the required state in time.
    #[error("tool `{tool}` did not become {required:?} within {timeout:?} (last seen {last:?})")]
    NotReady {
        /// Tool that was waited on.
        tool: ToolId,
        /// State that was required.
        required: ExposureState,
        /// State when the wait gave up, `None` if the tool was unregistered meanwhile.
        last: Option<ExposureState>,
        /// How long the wait lasted.
        timeout: Duration,
    },
    /// The host failed to invoke a tool.
    #[error("invoking tool `{tool}` failed")]
    Invocation {
        /// Tool being invoked.
        tool: ToolId,
        /// Host error.
        #[source]
        source: InvokeError,
    },
}

/// Configuration and logging setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {path:?}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML for [`ReachConfig`](crate::ReachConfig).
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// A log filter directive did not parse.
    #[error("invalid log directive `{directive}`: {message}")]
    LogDirective {
        /// The offending directive.
        directive: String,
        /// Parser message.
        message: String,
    },
    /// A global subscriber is already installed.
    #[error("logging already initialized: {0}")]
    LoggingInit(String),
}
