// Copyright (c) 2025 - Cowboy AI, Inc.
//! Method Faults
//!
//! Faults are structured, client-visible error *values*. A task records one as
//! its terminal outcome instead of a result; nothing here is ever propagated
//! with `?` across a task boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::ManagedObjectReference;

/// Client-visible fault carried as task outcome data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "fault")]
pub enum MethodFault {
    /// A state-machine guard rejected a transition to the current state
    #[error("The operation is not allowed in the current state")]
    InvalidState,

    /// A creation request did not name a host
    #[error("No host specified")]
    NoHost { name: Option<String> },

    /// A request argument is malformed
    #[error("A specified parameter was not correct: {invalid_property}")]
    InvalidArgument { invalid_property: String },

    /// The named object does not exist
    #[error("The object or item referred to could not be found: {object}")]
    NotFound { object: String },

    /// The named object already exists
    #[error("The specified key, name, or identifier '{name}' already exists")]
    AlreadyExists { name: String },

    /// The object is still used by dependents
    #[error("The resource '{name}' is in use")]
    ResourceInUse { name: String },

    /// The operation requires another power state
    #[error("The attempted operation cannot be performed in the current power state ({existing}, requested {requested})")]
    InvalidPowerState { requested: String, existing: String },

    /// A cascading destroy finished with failed dependent teardown calls
    #[error("{} dependent teardown call(s) failed", failures.len())]
    PartialTeardown { failures: Vec<TeardownFailure> },

    /// An internal consistency violation aborted the task
    #[error("A general system error occurred: {reason}")]
    SystemError { reason: String },
}

impl MethodFault {
    /// Fault type name as a client sees it
    pub fn name(&self) -> &'static str {
        match self {
            MethodFault::InvalidState => "InvalidState",
            MethodFault::NoHost { .. } => "NoHost",
            MethodFault::InvalidArgument { .. } => "InvalidArgument",
            MethodFault::NotFound { .. } => "NotFound",
            MethodFault::AlreadyExists { .. } => "AlreadyExists",
            MethodFault::ResourceInUse { .. } => "ResourceInUse",
            MethodFault::InvalidPowerState { .. } => "InvalidPowerState",
            MethodFault::PartialTeardown { .. } => "PartialTeardown",
            MethodFault::SystemError { .. } => "SystemError",
        }
    }

    /// Shorthand for [`MethodFault::InvalidArgument`]
    pub fn invalid_argument(property: impl Into<String>) -> Self {
        MethodFault::InvalidArgument {
            invalid_property: property.into(),
        }
    }

    /// Shorthand for [`MethodFault::NotFound`]
    pub fn not_found(object: impl fmt::Display) -> Self {
        MethodFault::NotFound {
            object: object.to_string(),
        }
    }
}

/// Phase of a cascading host destroy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownStep {
    /// Virtual machines, virtual apps and resource pools on the host
    Dependents,
    /// Standard virtual switches of the host's network system
    VirtualSwitches,
    /// Datastores mounted on the host
    Datastores,
    /// Distributed switch memberships through portgroup networks
    DistributedSwitches,
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeardownStep::Dependents => write!(f, "dependents"),
            TeardownStep::VirtualSwitches => write!(f, "virtual_switches"),
            TeardownStep::Datastores => write!(f, "datastores"),
            TeardownStep::DistributedSwitches => write!(f, "distributed_switches"),
        }
    }
}

/// One failed dependent teardown call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownFailure {
    /// Phase the call belonged to
    pub step: TeardownStep,

    /// Entity the call targeted (the network system for switch removals)
    pub entity: ManagedObjectReference,

    /// What the call is about (switch name, datastore name, ...)
    pub subject: String,

    /// Fault returned by the dependent
    pub fault: Box<MethodFault>,
}
