// Copyright (c) 2025 - Cowboy AI, Inc.
//! Teardown Report

use serde::{Deserialize, Serialize};

use crate::domain::{ManagedObjectReference, TeardownFailure};

/// What a cascading host destroy did; the result value of a successful
/// `HostSystem.destroy` task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeardownReport {
    /// Virtual machines, virtual apps and resource pools destroyed
    pub destroyed: Vec<ManagedObjectReference>,
    /// Standard switches removed from the host's network system
    pub removed_switches: Vec<String>,
    /// Datastores whose only mount was this host
    pub destroyed_datastores: Vec<ManagedObjectReference>,
    /// Shared datastores this host was unmounted from
    pub detached_datastores: Vec<ManagedObjectReference>,
    /// Distributed switches the host left
    pub reconfigured_switches: Vec<ManagedObjectReference>,
    pub failures: Vec<TeardownFailure>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
