// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session configuration.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! wait_timeout_ms = 5000
//! step_timeout_ms = 2000
//! ready_state = "interactable"
//!
//! [logging]
//! level = "info"
//! format = "text"
//!
//! [logging.modules]
//! understory_exposure = "debug"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use understory_exposure::ExposureState;

use crate::error::ConfigError;
use crate::logging::LoggingConfig;

/// Configuration of a [`Session`](crate::Session).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachConfig {
    /// How long to wait for the target tool once its context is reached.
    pub wait_timeout_ms: u64,
    /// How long to wait for each navigation tool on the route.
    pub step_timeout_ms: u64,
    /// State a tool must reach before it is invoked.
    pub ready_state: ExposureState,
    /// Logging setup used by [`init_logging`](crate::init_logging).
    pub logging: LoggingConfig,
}

impl Default for ReachConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: 5_000,
            step_timeout_ms: 2_000,
            ready_state: ExposureState::Interactable,
            logging: LoggingConfig::default(),
        }
    }
}

impl ReachConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Reject values that would make every wait fail or succeed vacuously.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wait_timeout_ms == 0 {
            return Err(ConfigError::Invalid("wait_timeout_ms must be positive".into()));
        }
        if self.step_timeout_ms == 0 {
            return Err(ConfigError::Invalid("step_timeout_ms must be positive".into()));
        }
        if self.ready_state == ExposureState::NotPresent {
            return Err(ConfigError::Invalid(
                "ready_state must be stronger than not_present".into(),
            ));
        }
        Ok(())
    }

    /// [`wait_timeout_ms`](Self::wait_timeout_ms) as a [`Duration`].
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// [`step_timeout_ms`](Self::step_timeout_ms) as a [`Duration`].
    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }
}
