// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured logging setup.
//!
//! The library crates only emit `tracing` events. Binaries and test harnesses that
//! want to see them call [`init_logging`] once at startup.
//!
//! Filter priority, highest first:
//! 1. the `UNDERSTORY_LOG` environment variable (standard `EnvFilter` syntax),
//! 2. [`LoggingConfig::level`] plus [`LoggingConfig::modules`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

use crate::error::ConfigError;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "UNDERSTORY_LOG";

/// Output format of log lines.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging section of [`ReachConfig`](crate::ReachConfig).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level: `trace`, `debug`, `info`, `warn`, `error` or `off`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Colored output (text format only).
    pub color: bool,
    /// Per-target levels, e.g. `understory_exposure = "trace"`.
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
            color: true,
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Build the filter described by this configuration, ignoring the environment.
    pub fn filter(&self) -> Result<EnvFilter, ConfigError> {
        let mut filter = parse_filter(&self.level)?;
        for (target, level) in &self.modules {
            let directive = format!("{target}={level}");
            let parsed: Directive = directive.parse().map_err(|e: ParseError| {
                ConfigError::LogDirective {
                    directive: directive.clone(),
                    message: e.to_string(),
                }
            })?;
            filter = filter.add_directive(parsed);
        }
        Ok(filter)
    }
}

fn parse_filter(directives: &str) -> Result<EnvFilter, ConfigError> {
    EnvFilter::try_new(directives).map_err(|e| ConfigError::LogDirective {
        directive: directives.to_owned(),
        message: e.to_string(),
    })
}

/// Install the global `tracing` subscriber.
///
/// Events go to stderr so stdout stays free for program output. Fails with
/// [`ConfigError::LoggingInit`] if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => parse_filter(&directives)?,
        _ => config.filter()?,
    };
    let base = Registry::default().with(filter);
    let result = match config.format {
        LogFormat::Json => base
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => base
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    result.map_err(|e| ConfigError::LoggingInit(e.to_string()))
}
