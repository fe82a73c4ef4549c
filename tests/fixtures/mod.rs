// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-vsphere-sim
//!
//! Builds small, deterministic inventories on top of the standalone ESX
//! layout. Every helper goes through the same factory and collaborator
//! functions the simulator uses, so fixtures never hand-assemble entities.

#![allow(dead_code)]

use cim_vsphere_sim::domain::{ManagedObjectReference, MethodFault};
use cim_vsphere_sim::inventory::{
    create_dvs, create_dvs_portgroup, create_local_datastore, create_nas_datastore,
    create_standalone_host, create_vm, host_parent, DvsConfigSpec, HostConnectSpec,
    NasVolumeSpec, ReconfigureDvsWork, VmSpec,
};
use cim_vsphere_sim::model::{ComputeResource, HostConfigManager, HostConnectionState, HostSystem};
use cim_vsphere_sim::task::{run_nested, TaskExecution};
use cim_vsphere_sim::{telemetry, Simulator, SimulatorConfig, TeardownFailurePolicy};

/// Standalone ESX simulator running tasks inline
pub fn esx(policy: TeardownFailurePolicy) -> Simulator {
    telemetry::init_tracing();
    Simulator::esx(SimulatorConfig::default().with_teardown_failure_policy(policy))
        .expect("default configuration is valid")
}

/// Standalone ESX simulator running tasks on the blocking pool
pub fn esx_spawned() -> Simulator {
    telemetry::init_tracing();
    Simulator::esx(SimulatorConfig::default().with_task_execution(TaskExecution::Spawned))
        .expect("default configuration is valid")
}

/// The `ha-host` of the standalone layout
pub fn default_host(sim: &Simulator) -> ManagedObjectReference {
    sim.layout().expect("esx layout").host.clone()
}

pub fn config_manager(sim: &Simulator, host: &ManagedObjectReference) -> HostConfigManager {
    sim.registry()
        .read()
        .get_as::<HostSystem>(host)
        .expect("host is registered")
        .config_manager
        .clone()
}

/// Add a connected standalone host to the layout's host folder
pub fn add_host(sim: &Simulator, name: &str) -> ManagedObjectReference {
    let folder = sim.layout().expect("esx layout").host_folder.clone();
    let mut registry = sim.registry().write();
    let host = create_standalone_host(&mut registry, &folder, &HostConnectSpec::new(name))
        .expect("folder resolves")
        .expect("valid host name");
    registry
        .get_as_mut::<HostSystem>(&host)
        .expect("host is registered")
        .runtime
        .connection_state = HostConnectionState::Connected;
    host
}

pub fn nas_spec(name: &str) -> NasVolumeSpec {
    NasVolumeSpec {
        remote_host: "filer01.lab".to_string(),
        remote_path: format!("/export/{name}"),
        local_path: name.to_string(),
    }
}

/// Mount the same NFS volume on `host`
pub fn mount_nas(sim: &Simulator, host: &ManagedObjectReference, name: &str) -> ManagedObjectReference {
    let ds_system = config_manager(sim, host)
        .datastore_system
        .expect("host has a datastore system");
    let mut registry = sim.registry().write();
    create_nas_datastore(&mut registry, &ds_system, &nas_spec(name))
        .expect("datastore system resolves")
        .expect("volume mounts")
}

pub fn local_datastore(sim: &Simulator, host: &ManagedObjectReference, name: &str) -> ManagedObjectReference {
    let ds_system = config_manager(sim, host)
        .datastore_system
        .expect("host has a datastore system");
    let mut registry = sim.registry().write();
    create_local_datastore(&mut registry, &ds_system, name, &format!("/vmfs/volumes/{name}"))
        .expect("datastore system resolves")
        .expect("name is free")
}

/// Root resource pool of a host's compute resource
pub fn root_pool(sim: &Simulator, host: &ManagedObjectReference) -> ManagedObjectReference {
    let registry = sim.registry().read();
    let cr = host_parent(&registry, host)
        .expect("host is registered")
        .expect("host has a compute resource");
    registry
        .get_as::<ComputeResource>(&cr)
        .expect("compute resource is registered")
        .resource_pool
        .clone()
        .expect("compute resource has a root pool")
}

/// Virtual machine in the host's root pool
pub fn vm_on(
    sim: &Simulator,
    host: &ManagedObjectReference,
    name: &str,
    powered_on: bool,
) -> ManagedObjectReference {
    let mut spec = VmSpec::new(name, host.clone(), root_pool(sim, host));
    if powered_on {
        spec = spec.powered_on();
    }
    let mut registry = sim.registry().write();
    create_vm(&mut registry, &spec)
        .expect("placement resolves")
        .expect("valid vm spec")
}

/// Distributed switch with one portgroup and `hosts` as members
pub fn dvs_with_members(
    sim: &Simulator,
    name: &str,
    hosts: &[ManagedObjectReference],
) -> (ManagedObjectReference, ManagedObjectReference) {
    let folder = sim.layout().expect("esx layout").network_folder.clone();
    let mut registry = sim.registry().write();

    let dvs = create_dvs(&mut registry, &folder, name).expect("network folder resolves");
    let portgroup = create_dvs_portgroup(&mut registry, &dvs, &format!("{name}-pg"))
        .expect("switch resolves");

    for host in hosts {
        let info = run_nested(
            &mut registry,
            ReconfigureDvsWork {
                dvs: dvs.clone(),
                spec: DvsConfigSpec::add_host(host.clone()),
            },
        )
        .expect("reconfigure runs");
        assert_eq!(info.error(), None::<&MethodFault>);
    }
    (dvs, portgroup)
}
