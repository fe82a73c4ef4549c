// Copyright (c) 2025 - Cowboy AI, Inc.
//! Host Factories
//!
//! A host never exists without its three sub-managers. [`new_host_system`]
//! allocates the host reference first so the datastore system, network
//! system and patch manager can point back at it, then wires them into
//! `config_manager` in one step.
//!
//! # Standalone Layout
//!
//! ```text
//! Folder (host folder)
//!   └─ ComputeResource "esx01"
//!        ├─ HostSystem "esx01"
//!        └─ ResourcePool "Resources" (root, owner = compute resource)
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::folder::put_datacenter;
use super::network::create_network;
use super::MethodResult;
use crate::domain::{HostName, ManagedObjectReference, ManagedObjectType};
use crate::errors::SimulatorResult;
use crate::model::{
    ComputeResource, Folder, HostConfigManager, HostConnectionState, HostDatastoreSystem,
    HostNetworkInfo, HostNetworkSystem, HostPatchManager, HostSystem, Network, ResourcePool,
};
use crate::registry::EntityRegistry;

/// Name of every root resource pool
pub const ROOT_POOL_NAME: &str = "Resources";

/// Request to attach a standalone host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConnectSpec {
    pub host_name: String,
    pub port: Option<u16>,
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub force: bool,
}

impl HostConnectSpec {
    pub fn new(host_name: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            ..Self::default()
        }
    }
}

/// Fixed references of the standalone ESX inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsxLayout {
    pub datacenter: ManagedObjectReference,
    pub host_folder: ManagedObjectReference,
    pub vm_folder: ManagedObjectReference,
    pub datastore_folder: ManagedObjectReference,
    pub network_folder: ManagedObjectReference,
    pub host: ManagedObjectReference,
    pub compute_resource: ManagedObjectReference,
    pub resource_pool: ManagedObjectReference,
    pub network: ManagedObjectReference,
}

/// Prepare a host from a template and register its sub-managers
///
/// The host itself is returned unregistered; the caller places it under its
/// compute resource with [`EntityRegistry::put_entity`].
pub fn new_host_system(registry: &mut EntityRegistry, mut host: HostSystem) -> HostSystem {
    if host.base.self_ref.is_unset() {
        host.base.self_ref = registry.allocate_reference(ManagedObjectType::HostSystem);
    }
    let reference = host.base.self_ref.clone();

    host.base.name = host.summary.config.name.clone();
    host.runtime.boot_time = Some(Utc::now());

    let datastore_system = registry.put(HostDatastoreSystem::new(reference.clone()));
    let network_system = registry.put(HostNetworkSystem::new(
        reference.clone(),
        HostNetworkInfo::esx_default(),
    ));
    let patch_manager = registry.put(HostPatchManager::new(reference.clone()));

    host.config_manager = HostConfigManager {
        datastore_system: Some(datastore_system),
        network_system: Some(network_system),
        patch_manager: Some(patch_manager),
    };

    debug!(host = %reference, name = %host.base.name, "Host sub-managers registered");
    host
}

/// Build the inventory of a standalone ESX host under `root_folder`
pub fn create_default_esx(
    registry: &mut EntityRegistry,
    root_folder: &ManagedObjectReference,
    host_name: &str,
) -> SimulatorResult<EsxLayout> {
    let fixed = |kind, value: &str| ManagedObjectReference::new(kind, value);

    let host_folder = fixed(ManagedObjectType::Folder, "ha-folder-host");
    let vm_folder = fixed(ManagedObjectType::Folder, "ha-folder-vm");
    let datastore_folder = fixed(ManagedObjectType::Folder, "ha-folder-datastore");
    let network_folder = fixed(ManagedObjectType::Folder, "ha-folder-network");
    let datacenter = put_datacenter(
        registry,
        root_folder,
        fixed(ManagedObjectType::Datacenter, "ha-datacenter"),
        "ha-datacenter",
        [
            host_folder.clone(),
            vm_folder.clone(),
            datastore_folder.clone(),
            network_folder.clone(),
        ],
    )?;

    let compute_resource = fixed(ManagedObjectType::ComputeResource, "ha-compute-res");
    let resource_pool = fixed(ManagedObjectType::ResourcePool, "ha-root-pool");

    let mut template = HostSystem::template(host_name);
    template.base.self_ref = fixed(ManagedObjectType::HostSystem, "ha-host");
    let host = new_host_system(registry, template);

    let mut cr = ComputeResource::new(host.base.name.clone());
    cr.base.self_ref = compute_resource.clone();
    cr.host.push(host.base.self_ref.clone());
    cr.resource_pool = Some(resource_pool.clone());

    let host = registry.put_entity(&compute_resource, host);

    let mut pool = ResourcePool::new(ROOT_POOL_NAME);
    pool.base.self_ref = resource_pool.clone();
    pool.owner = Some(compute_resource.clone());
    registry.put_entity(&compute_resource, pool);

    registry.put_entity(&host_folder, cr);
    registry
        .get_as_mut::<Folder>(&host_folder)?
        .add_child(compute_resource.clone());

    let network = create_network(registry, &network_folder, "VM Network")?;
    registry.get_as_mut::<Network>(&network)?.host.push(host.clone());
    registry.get_as_mut::<HostSystem>(&host)?.network.push(network.clone());

    info!(host = %host, "Standalone ESX inventory created");

    Ok(EsxLayout {
        datacenter,
        host_folder,
        vm_folder,
        datastore_folder,
        network_folder,
        host,
        compute_resource,
        resource_pool,
        network,
    })
}

/// Create a disconnected standalone host, its compute resource and root pool
///
/// An empty host name is a `NoHost` fault, a malformed one `InvalidArgument`.
pub fn create_standalone_host(
    registry: &mut EntityRegistry,
    folder: &ManagedObjectReference,
    spec: &HostConnectSpec,
) -> MethodResult<ManagedObjectReference> {
    let name = match HostName::new(spec.host_name.as_str()) {
        Ok(name) => name,
        Err(err) => return Ok(Err(err.to_fault(&spec.host_name))),
    };

    // resolve the folder before touching the registry
    registry.get_as::<Folder>(folder)?;

    let mut host = new_host_system(registry, HostSystem::template(name.as_str()));
    host.runtime.connection_state = HostConnectionState::Disconnected;
    if let Some(port) = spec.port {
        host.summary.config.port = port;
    }

    let cr_ref = registry.allocate_reference(ManagedObjectType::ComputeResource);
    let host_ref = registry.put_entity(&cr_ref, host);

    let mut pool = ResourcePool::new(ROOT_POOL_NAME);
    pool.owner = Some(cr_ref.clone());
    let pool_ref = registry.put_entity(&cr_ref, pool);

    let mut cr = ComputeResource::new(name.as_str());
    cr.base.self_ref = cr_ref.clone();
    cr.host.push(host_ref.clone());
    cr.resource_pool = Some(pool_ref);
    registry.put_entity(folder, cr);
    registry.get_as_mut::<Folder>(folder)?.add_child(cr_ref.clone());

    info!(host = %host_ref, name = %name, compute_resource = %cr_ref, "Standalone host created");
    Ok(Ok(host_ref))
}

/// Compute resource owning `host`, if any
pub fn host_parent(
    registry: &EntityRegistry,
    host: &ManagedObjectReference,
) -> SimulatorResult<Option<ManagedObjectReference>> {
    let host = registry.get_as::<HostSystem>(host)?;
    Ok(host
        .base
        .parent
        .as_ref()
        .filter(|p| p.kind == ManagedObjectType::ComputeResource)
        .cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MethodFault;
    use crate::inventory::create_root_folder;
    use crate::model::{Entity, HostPowerState};

    #[test]
    fn test_new_host_system_registers_sub_managers() {
        let mut registry = EntityRegistry::new();
        let host = new_host_system(&mut registry, HostSystem::template("esx01"));

        assert_eq!(host.base.name, "esx01");
        assert!(host.runtime.boot_time.is_some());
        assert_eq!(host.config_manager.references().len(), 3);
        for sub in host.config_manager.references() {
            assert!(registry.contains(sub));
        }
        let ns = host.config_manager.network_system.as_ref().unwrap();
        let ns = registry.get_as::<HostNetworkSystem>(ns).unwrap();
        assert_eq!(ns.host, host.base.self_ref);
    }

    #[test]
    fn test_default_esx_layout() {
        let mut registry = EntityRegistry::new();
        let root = create_root_folder(&mut registry);
        let layout = create_default_esx(&mut registry, &root, "localhost.localdomain").unwrap();

        assert_eq!(layout.host.value, "ha-host");
        assert_eq!(layout.compute_resource.value, "ha-compute-res");
        assert_eq!(
            host_parent(&registry, &layout.host).unwrap(),
            Some(layout.compute_resource.clone())
        );

        let host = registry.get_as::<HostSystem>(&layout.host).unwrap();
        assert_eq!(host.runtime.power_state, HostPowerState::PoweredOn);
        assert_eq!(host.runtime.connection_state, HostConnectionState::Connected);
        assert_eq!(host.network, vec![layout.network.clone()]);

        let pool = registry.get_as::<ResourcePool>(&layout.resource_pool).unwrap();
        assert!(pool.is_root());
        assert_eq!(pool.owner.as_ref(), Some(&layout.compute_resource));
        assert!(registry.dangling_references().is_empty());
    }

    #[test]
    fn test_standalone_host() {
        let mut registry = EntityRegistry::new();
        let root = create_root_folder(&mut registry);
        let host = create_standalone_host(&mut registry, &root, &HostConnectSpec::new("esx02.lab"))
            .unwrap()
            .unwrap();

        let record = registry.get_as::<HostSystem>(&host).unwrap();
        assert_eq!(record.name(), "esx02.lab");
        assert_eq!(record.runtime.connection_state, HostConnectionState::Disconnected);

        let cr = host_parent(&registry, &host).unwrap().unwrap();
        let cr = registry.get_as::<ComputeResource>(&cr).unwrap();
        assert_eq!(cr.name(), "esx02.lab");
        assert_eq!(cr.host, vec![host.clone()]);
        assert!(registry
            .get_as::<Folder>(&root)
            .unwrap()
            .child_entity
            .contains(cr.reference()));
        assert!(registry.dangling_references().is_empty());
    }

    #[test]
    fn test_standalone_host_name_faults() {
        let mut registry = EntityRegistry::new();
        let root = create_root_folder(&mut registry);
        let before = registry.len();

        let fault = create_standalone_host(&mut registry, &root, &HostConnectSpec::new(""))
            .unwrap()
            .unwrap_err();
        assert_eq!(fault, MethodFault::NoHost { name: None });

        let fault = create_standalone_host(&mut registry, &root, &HostConnectSpec::new("bad name"))
            .unwrap()
            .unwrap_err();
        assert_eq!(fault, MethodFault::invalid_argument("hostName"));
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn test_standalone_host_accepts_underscore() {
        let mut registry = EntityRegistry::new();
        let root = create_root_folder(&mut registry);

        let host = create_standalone_host(&mut registry, &root, &HostConnectSpec::new("esx_01"))
            .unwrap()
            .unwrap();
        assert_eq!(registry.get(&host).unwrap().name(), "esx_01");
    }
}
