// Copyright (c) 2025 - Cowboy AI, Inc.
//! Managed Object Type Taxonomy
//!
//! Defines the closed set of managed object types the simulator can hold in
//! its registry. The names mirror the vSphere API type names so references
//! read the way a real client expects (`HostSystem:host-12`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Managed object type taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ManagedObjectType {
    // Inventory containers
    /// Inventory folder
    Folder,
    /// Datacenter
    Datacenter,

    // Compute
    /// ESX host
    HostSystem,
    /// Standalone compute resource wrapping a single host
    ComputeResource,
    /// Resource pool
    ResourcePool,
    /// Virtual application (resource pool with member VMs)
    VirtualApp,
    /// Virtual machine
    VirtualMachine,

    // Storage
    /// Datastore
    Datastore,

    // Networking
    /// Standard network
    Network,
    /// Distributed virtual portgroup
    DistributedVirtualPortgroup,
    /// Distributed virtual switch
    VmwareDistributedVirtualSwitch,

    // Host sub-managers
    /// Per-host datastore manager
    HostDatastoreSystem,
    /// Per-host network manager
    HostNetworkSystem,
    /// Per-host patch manager
    HostPatchManager,

    // Control plane
    /// Task
    Task,
}

/// Broad grouping of managed object types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    /// Folders and datacenters
    Container,
    /// Hosts, pools, virtual machines
    Compute,
    /// Datastores
    Storage,
    /// Networks, portgroups, switches
    Network,
    /// Sub-managers owned by exactly one host
    HostManager,
    /// Tasks
    ControlPlane,
}

impl ManagedObjectType {
    /// Get the category for this type
    pub fn category(&self) -> ObjectCategory {
        use ManagedObjectType::*;
        match self {
            Folder | Datacenter => ObjectCategory::Container,
            HostSystem | ComputeResource | ResourcePool | VirtualApp | VirtualMachine => {
                ObjectCategory::Compute
            }
            Datastore => ObjectCategory::Storage,
            Network | DistributedVirtualPortgroup | VmwareDistributedVirtualSwitch => {
                ObjectCategory::Network
            }
            HostDatastoreSystem | HostNetworkSystem | HostPatchManager => {
                ObjectCategory::HostManager
            }
            Task => ObjectCategory::ControlPlane,
        }
    }

    /// Prefix used when allocating a reference value (`host` in `host-12`)
    pub fn reference_prefix(&self) -> &'static str {
        use ManagedObjectType::*;
        match self {
            Folder => "group",
            Datacenter => "datacenter",
            HostSystem => "host",
            ComputeResource => "domain-s",
            ResourcePool => "resgroup",
            VirtualApp => "resgroup-v",
            VirtualMachine => "vm",
            Datastore => "datastore",
            Network => "network",
            DistributedVirtualPortgroup => "dvportgroup",
            VmwareDistributedVirtualSwitch => "dvs",
            HostDatastoreSystem => "hostdatastoresystem",
            HostNetworkSystem => "hostnetworksystem",
            HostPatchManager => "hostpatchmanager",
            Task => "task",
        }
    }

    /// Whether objects of this type appear in the inventory tree
    pub fn is_inventory_entity(&self) -> bool {
        !matches!(
            self.category(),
            ObjectCategory::HostManager | ObjectCategory::ControlPlane
        )
    }

    /// API type name
    pub fn as_str(&self) -> &'static str {
        use ManagedObjectType::*;
        match self {
            Folder => "Folder",
            Datacenter => "Datacenter",
            HostSystem => "HostSystem",
            ComputeResource => "ComputeResource",
            ResourcePool => "ResourcePool",
            VirtualApp => "VirtualApp",
            VirtualMachine => "VirtualMachine",
            Datastore => "Datastore",
            Network => "Network",
            DistributedVirtualPortgroup => "DistributedVirtualPortgroup",
            VmwareDistributedVirtualSwitch => "VmwareDistributedVirtualSwitch",
            HostDatastoreSystem => "HostDatastoreSystem",
            HostNetworkSystem => "HostNetworkSystem",
            HostPatchManager => "HostPatchManager",
            Task => "Task",
        }
    }

    /// All known types
    pub fn all() -> &'static [ManagedObjectType] {
        use ManagedObjectType::*;
        &[
            Folder,
            Datacenter,
            HostSystem,
            ComputeResource,
            ResourcePool,
            VirtualApp,
            VirtualMachine,
            Datastore,
            Network,
            DistributedVirtualPortgroup,
            VmwareDistributedVirtualSwitch,
            HostDatastoreSystem,
            HostNetworkSystem,
            HostPatchManager,
            Task,
        ]
    }
}

impl fmt::Display for ManagedObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ManagedObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown managed object type: {s}"))
    }
}
