// Copyright (c) 2025 - Cowboy AI, Inc.
//! Simulated Managed Objects
//!
//! Every registry-resident object is a plain record that *composes* an
//! [`EntityBase`] (identity, name, parent) with the fields the simulator
//! needs for that kind. The [`Entity`] trait is the narrow interface the
//! registry and the teardown code use to walk links between records without
//! knowing their concrete type.
//!
//! # Entity Kinds
//!
//! - [`host`] - `HostSystem` with runtime, summary and config-manager links
//! - [`compute`] - compute resources, resource pools, virtual apps, VMs
//! - [`storage`] - datastores and per-host datastore systems
//! - [`network`] - networks, portgroups, switches and per-host network systems
//! - [`patch`] - per-host patch manager
//! - [`folder`] - folders and datacenters
//! - [`task`] - tasks and their terminal outcome

pub mod compute;
pub mod folder;
pub mod host;
pub mod network;
pub mod patch;
pub mod storage;
pub mod task;

use serde::{Deserialize, Serialize};

use crate::domain::{ManagedObjectReference, ManagedObjectType};

pub use compute::{
    ComputeResource, ResourcePool, VirtualApp, VirtualMachine, VirtualMachinePowerState,
    VirtualMachineRuntimeInfo,
};
pub use folder::{Datacenter, Folder};
pub use host::{
    HostConfigManager, HostConfigSummary, HostConnectionState, HostListSummary, HostPowerState,
    HostRuntimeInfo, HostSystem,
};
pub use network::{
    DistributedVirtualPortgroup, DistributedVirtualSwitchHostMember, DvsConfigInfo,
    HostNetworkInfo, HostNetworkSystem, HostPortGroup, HostVirtualSwitch, Network,
    VmwareDistributedVirtualSwitch,
};
pub use patch::HostPatchManager;
pub use storage::{
    Datastore, DatastoreHostMount, DatastoreSummary, DatastoreType, HostDatastoreSystem,
};
pub use task::{Task, TaskInfo, TaskInfoState, TaskOutcome};

/// Identity shared by every managed object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBase {
    /// Own reference (`Self` in the API)
    #[serde(rename = "self")]
    pub self_ref: ManagedObjectReference,

    /// Display name
    pub name: String,

    /// Owning entity, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ManagedObjectReference>,
}

impl EntityBase {
    /// Base with an unallocated reference
    pub fn new(kind: ManagedObjectType, name: impl Into<String>) -> Self {
        Self {
            self_ref: ManagedObjectReference::unset(kind),
            name: name.into(),
            parent: None,
        }
    }

    /// Base with a fixed reference
    pub fn with_reference(reference: ManagedObjectReference, name: impl Into<String>) -> Self {
        Self {
            self_ref: reference,
            name: name.into(),
            parent: None,
        }
    }
}

/// Narrow interface over every simulated record
pub trait Entity {
    /// Shared identity
    fn base(&self) -> &EntityBase;

    /// Shared identity, mutable
    fn base_mut(&mut self) -> &mut EntityBase;

    /// References to other entities held by this record, parent excluded
    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        Vec::new()
    }

    /// Drop every link to `target` held by this record, parent excluded
    fn detach_reference(&mut self, _target: &ManagedObjectReference) {}

    /// Own reference
    fn reference(&self) -> &ManagedObjectReference {
        &self.base().self_ref
    }

    /// Display name
    fn name(&self) -> &str {
        &self.base().name
    }
}

/// Remove `target` from a reference list, keeping order
pub(crate) fn retain_without(list: &mut Vec<ManagedObjectReference>, target: &ManagedObjectReference) {
    list.retain(|r| r != target);
}

/// Clear an optional link when it points at `target`
pub(crate) fn clear_if(slot: &mut Option<ManagedObjectReference>, target: &ManagedObjectReference) {
    if slot.as_ref() == Some(target) {
        *slot = None;
    }
}

/// Push a reference unless already present
pub(crate) fn push_unique(list: &mut Vec<ManagedObjectReference>, reference: ManagedObjectReference) {
    if !list.contains(&reference) {
        list.push(reference);
    }
}
