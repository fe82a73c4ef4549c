// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Collaborators
//!
//! Minimal in-process implementations of the managed objects a host
//! interacts with. Each submodule owns the operations of one kind:
//!
//! - [`host`] - host factories and the standalone ESX layout
//! - [`folder`] - root folder, datacenters, `AddStandaloneHost`
//! - [`virtual_machine`] - VM creation and the VM destroy task
//! - [`resource_pool`] - resource pools and virtual apps with their destroy tasks
//! - [`datastore`] - host datastore system operations
//! - [`network`] - host network system operations and standard networks
//! - [`dvs`] - distributed switches, portgroups and the reconfigure task
//! - [`patch`] - host patch manager install task
//!
//! Task-shaped operations implement [`TaskWork`](crate::task::TaskWork).
//! Synchronous operations return a [`MethodResult`]: the outer `Result`
//! carries fatal consistency errors, the inner one a client-visible fault.

pub mod datastore;
pub mod dvs;
pub mod folder;
pub mod host;
pub mod network;
pub mod patch;
pub mod resource_pool;
pub mod virtual_machine;

pub use datastore::{
    create_local_datastore, create_nas_datastore, destroy_datastore, remove_datastore,
    NasVolumeSpec,
};
pub use dvs::{
    create_dvs, create_dvs_portgroup, ConfigSpecOperation, DvsConfigSpec, DvsHostMemberConfigSpec,
    ReconfigureDvsWork,
};
pub use folder::{create_datacenter, create_root_folder, AddStandaloneHostWork};
pub use host::{
    create_default_esx, create_standalone_host, host_parent, new_host_system, EsxLayout,
    HostConnectSpec,
};
pub use network::{
    add_port_group, add_virtual_switch, create_network, remove_port_group,
    remove_virtual_switch, PortGroupSpec, VirtualSwitchSpec,
};
pub use patch::{installed_vibs, HostPatchSpec, InstallHostPatchWork};
pub use resource_pool::{
    create_resource_pool, create_virtual_app, DestroyResourcePoolWork, DestroyVirtualAppWork,
    PoolSpec,
};
pub use virtual_machine::{create_vm, DestroyVmWork, VmSpec};

use crate::domain::MethodFault;
use crate::errors::SimulatorResult;

/// Outcome of a synchronous collaborator call
pub type MethodResult<T> = SimulatorResult<Result<T, MethodFault>>;
