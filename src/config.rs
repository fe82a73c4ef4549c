// Copyright (c) 2025 - Cowboy AI, Inc.
//! Simulator Configuration
//!
//! Settings can be built in code with the `with_*` methods or loaded from
//! the environment:
//!
//! | Variable | Values | Default |
//! |---|---|---|
//! | `VSIM_TEARDOWN_POLICY` | `ignore`, `abort`, `report` | `ignore` |
//! | `VSIM_TASK_EXECUTION` | `inline`, `spawned` | `inline` |
//! | `VSIM_EVENT_HISTORY_LIMIT` | positive integer | `1000` |
//! | `VSIM_DEFAULT_HOST_NAME` | host name | `localhost.localdomain` |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::HostName;
use crate::errors::{SimulatorError, SimulatorResult};
use crate::events::DEFAULT_EVENT_HISTORY_LIMIT;
use crate::task::TaskExecution;

/// What a cascading host destroy does when a dependent teardown call faults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownFailurePolicy {
    /// Log and list the failure, keep going, succeed
    #[default]
    Ignore,

    /// Stop at the first failure and leave the host registered
    Abort,

    /// Run every step, release the host, fault with the collected failures
    ReportPartial,
}

impl fmt::Display for TeardownFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeardownFailurePolicy::Ignore => write!(f, "ignore"),
            TeardownFailurePolicy::Abort => write!(f, "abort"),
            TeardownFailurePolicy::ReportPartial => write!(f, "report"),
        }
    }
}

impl FromStr for TeardownFailurePolicy {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(TeardownFailurePolicy::Ignore),
            "abort" => Ok(TeardownFailurePolicy::Abort),
            "report" | "report_partial" => Ok(TeardownFailurePolicy::ReportPartial),
            other => Err(SimulatorError::Configuration(format!(
                "unknown teardown policy '{other}'"
            ))),
        }
    }
}

pub const DEFAULT_HOST_NAME: &str = "localhost.localdomain";

/// Configuration for a [`Simulator`](crate::service::Simulator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub teardown_failure_policy: TeardownFailurePolicy,
    pub task_execution: TaskExecution,
    /// Maximum number of retained event records
    pub event_history_limit: usize,
    /// Name of the host created by the standalone ESX layout
    pub default_host_name: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            teardown_failure_policy: TeardownFailurePolicy::default(),
            task_execution: TaskExecution::default(),
            event_history_limit: DEFAULT_EVENT_HISTORY_LIMIT,
            default_host_name: DEFAULT_HOST_NAME.to_string(),
        }
    }
}

impl SimulatorConfig {
    pub fn with_teardown_failure_policy(mut self, policy: TeardownFailurePolicy) -> Self {
        self.teardown_failure_policy = policy;
        self
    }

    pub fn with_task_execution(mut self, execution: TaskExecution) -> Self {
        self.task_execution = execution;
        self
    }

    pub fn with_event_history_limit(mut self, limit: usize) -> Self {
        self.event_history_limit = limit;
        self
    }

    pub fn with_default_host_name(mut self, name: impl Into<String>) -> Self {
        self.default_host_name = name.into();
        self
    }

    /// Load configuration from `VSIM_*` environment variables
    pub fn from_env() -> SimulatorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> SimulatorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(policy) = lookup("VSIM_TEARDOWN_POLICY") {
            config.teardown_failure_policy = policy.parse()?;
        }

        if let Some(execution) = lookup("VSIM_TASK_EXECUTION") {
            config.task_execution = execution.parse()?;
        }

        if let Some(limit) = lookup("VSIM_EVENT_HISTORY_LIMIT") {
            config.event_history_limit = limit.trim().parse().map_err(|_| {
                SimulatorError::Configuration(format!("invalid event history limit '{limit}'"))
            })?;
        }

        if let Some(name) = lookup("VSIM_DEFAULT_HOST_NAME") {
            config.default_host_name = name;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> SimulatorResult<()> {
        if self.event_history_limit == 0 {
            return Err(SimulatorError::Configuration(
                "event history limit must be positive".to_string(),
            ));
        }

        HostName::new(&self.default_host_name).map_err(|e| {
            SimulatorError::Configuration(format!(
                "invalid default host name '{}': {e}",
                self.default_host_name
            ))
        })?;

        Ok(())
    }
}
