// Copyright (c) 2025 - Cowboy AI, Inc.
//! Host Datastore System
//!
//! Datastores are shared entities: a NAS volume mounted by two hosts is one
//! datastore with two host mounts. Detaching one host (`remove_datastore`)
//! only drops that mount; `destroy_datastore` removes the datastore from
//! the inventory entirely.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::MethodResult;
use crate::domain::{ManagedObjectReference, ManagedObjectType, MethodFault};
use crate::errors::SimulatorResult;
use crate::events::EventKind;
use crate::model::{
    Datastore, DatastoreHostMount, DatastoreSummary, DatastoreType, Entity, HostDatastoreSystem,
    HostSystem, VirtualMachine,
};
use crate::registry::EntityRegistry;

/// Default capacity reported for simulated datastores (1 TiB)
const DEFAULT_CAPACITY: u64 = 1 << 40;

/// Request to mount an NFS volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NasVolumeSpec {
    pub remote_host: String,
    pub remote_path: String,
    /// Datastore name
    pub local_path: String,
}

impl NasVolumeSpec {
    fn url(&self) -> String {
        format!("nfs://{}{}", self.remote_host, self.remote_path)
    }
}

fn owning_host(
    registry: &EntityRegistry,
    datastore_system: &ManagedObjectReference,
) -> SimulatorResult<ManagedObjectReference> {
    Ok(registry
        .get_as::<HostDatastoreSystem>(datastore_system)?
        .host
        .clone())
}

fn mount(
    registry: &mut EntityRegistry,
    host: &ManagedObjectReference,
    datastore: &ManagedObjectReference,
    path: String,
) -> SimulatorResult<()> {
    registry
        .get_as_mut::<Datastore>(datastore)?
        .host
        .push(DatastoreHostMount {
            key: host.clone(),
            path,
        });
    registry
        .get_as_mut::<HostSystem>(host)?
        .datastore
        .push(datastore.clone());
    Ok(())
}

/// Create a VMFS datastore backed by a local disk of the system's host
pub fn create_local_datastore(
    registry: &mut EntityRegistry,
    datastore_system: &ManagedObjectReference,
    name: &str,
    path: &str,
) -> MethodResult<ManagedObjectReference> {
    if name.is_empty() {
        return Ok(Err(MethodFault::invalid_argument("name")));
    }
    let host = owning_host(registry, datastore_system)?;
    let host_record = registry.get_as::<HostSystem>(&host)?;
    for existing in &host_record.datastore {
        if registry.get(existing)?.name() == name {
            return Ok(Err(MethodFault::AlreadyExists {
                name: name.to_string(),
            }));
        }
    }

    let summary = DatastoreSummary {
        url: format!("ds:///vmfs/volumes/{name}/"),
        capacity: DEFAULT_CAPACITY,
        free_space: DEFAULT_CAPACITY,
        kind: DatastoreType::Local,
    };
    let datastore = registry.put(Datastore::new(name, summary));
    mount(registry, &host, &datastore, path.to_string())?;

    debug!(host = %host, datastore = %datastore, name, "Local datastore created");
    Ok(Ok(datastore))
}

/// Mount an NFS volume on the system's host
///
/// A volume already known to the inventory under the same URL is mounted
/// again rather than duplicated, which is how shared storage comes about.
pub fn create_nas_datastore(
    registry: &mut EntityRegistry,
    datastore_system: &ManagedObjectReference,
    spec: &NasVolumeSpec,
) -> MethodResult<ManagedObjectReference> {
    if spec.local_path.is_empty() {
        return Ok(Err(MethodFault::invalid_argument("localPath")));
    }
    let host = owning_host(registry, datastore_system)?;
    let url = spec.url();

    let existing = registry
        .references_of_type(ManagedObjectType::Datastore)
        .into_iter()
        .find(|r| {
            registry
                .get_as::<Datastore>(r)
                .is_ok_and(|ds| ds.summary.url == url)
        });

    let datastore = match existing {
        Some(datastore) => {
            if registry.get_as::<Datastore>(&datastore)?.is_mounted_on(&host) {
                return Ok(Err(MethodFault::AlreadyExists {
                    name: spec.local_path.clone(),
                }));
            }
            datastore
        }
        None => {
            let summary = DatastoreSummary {
                url,
                capacity: DEFAULT_CAPACITY,
                free_space: DEFAULT_CAPACITY,
                kind: DatastoreType::Nfs,
            };
            registry.put(Datastore::new(spec.local_path.as_str(), summary))
        }
    };

    mount(registry, &host, &datastore, spec.remote_path.clone())?;
    debug!(host = %host, datastore = %datastore, "NAS datastore mounted");
    Ok(Ok(datastore))
}

/// Unmount a datastore from the system's host; the datastore stays
pub fn remove_datastore(
    registry: &mut EntityRegistry,
    datastore_system: &ManagedObjectReference,
    datastore: &ManagedObjectReference,
    task: Option<&ManagedObjectReference>,
) -> MethodResult<()> {
    let host = owning_host(registry, datastore_system)?;
    let record = registry.get_as::<Datastore>(datastore)?;
    if !record.is_mounted_on(&host) {
        return Ok(Err(MethodFault::not_found(datastore)));
    }

    for vm in &record.vm {
        let vm_host = registry.get_as::<VirtualMachine>(vm)?.runtime.host.as_ref();
        if vm_host == Some(&host) {
            return Ok(Err(MethodFault::ResourceInUse {
                name: record.name().to_string(),
            }));
        }
    }
    let name = record.name().to_string();

    registry.get_as_mut::<Datastore>(datastore)?.unmount(&host);
    registry
        .get_as_mut::<HostSystem>(&host)?
        .datastore
        .retain(|ds| ds != datastore);
    registry.record_event(
        &host,
        task,
        EventKind::DatastoreRemoved {
            datastore: datastore.clone(),
            name: name.clone(),
        },
    );

    info!(host = %host, datastore = %datastore, name = %name, "Datastore removed from host");
    Ok(Ok(()))
}

/// Remove a datastore from the inventory
pub fn destroy_datastore(
    registry: &mut EntityRegistry,
    datastore_system: &ManagedObjectReference,
    datastore: &ManagedObjectReference,
    task: Option<&ManagedObjectReference>,
) -> MethodResult<()> {
    let host = owning_host(registry, datastore_system)?;
    let record = registry.get_as::<Datastore>(datastore)?;
    if !record.is_mounted_on(&host) {
        return Ok(Err(MethodFault::not_found(datastore)));
    }
    if !record.vm.is_empty() {
        return Ok(Err(MethodFault::ResourceInUse {
            name: record.name().to_string(),
        }));
    }

    let name = record.name().to_string();
    let mounts: Vec<ManagedObjectReference> = record.host.iter().map(|m| m.key.clone()).collect();
    for mounted_on in &mounts {
        registry
            .get_as_mut::<HostSystem>(mounted_on)?
            .datastore
            .retain(|ds| ds != datastore);
    }
    registry.remove(datastore);
    registry.detach_references(datastore);
    registry.record_event(
        &host,
        task,
        EventKind::DatastoreDestroyed {
            datastore: datastore.clone(),
            name: name.clone(),
        },
    );

    info!(host = %host, datastore = %datastore, name = %name, "Datastore destroyed");
    Ok(Ok(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::host::new_host_system;

    fn host(registry: &mut EntityRegistry, name: &str) -> (ManagedObjectReference, ManagedObjectReference) {
        let host = new_host_system(registry, HostSystem::template(name));
        let ds_system = host.config_manager.datastore_system.clone().unwrap();
        let host = registry.put(host);
        (host, ds_system)
    }

    fn nas() -> NasVolumeSpec {
        NasVolumeSpec {
            remote_host: "filer01".to_string(),
            remote_path: "/export/vol1".to_string(),
            local_path: "nfs-vol1".to_string(),
        }
    }

    #[test]
    fn test_nas_volume_is_shared() {
        let mut registry = EntityRegistry::new();
        let (host_a, sys_a) = host(&mut registry, "esx01");
        let (host_b, sys_b) = host(&mut registry, "esx02");

        let ds_a = create_nas_datastore(&mut registry, &sys_a, &nas()).unwrap().unwrap();
        let ds_b = create_nas_datastore(&mut registry, &sys_b, &nas()).unwrap().unwrap();
        assert_eq!(ds_a, ds_b);

        let ds = registry.get_as::<Datastore>(&ds_a).unwrap();
        assert_eq!(ds.host_count(), 2);
        assert!(ds.is_mounted_on(&host_a) && ds.is_mounted_on(&host_b));

        let again = create_nas_datastore(&mut registry, &sys_a, &nas()).unwrap();
        assert!(matches!(again, Err(MethodFault::AlreadyExists { .. })));
    }

    #[test]
    fn test_remove_keeps_datastore() {
        let mut registry = EntityRegistry::new();
        let (host_a, sys_a) = host(&mut registry, "esx01");
        let (_host_b, sys_b) = host(&mut registry, "esx02");
        let ds = create_nas_datastore(&mut registry, &sys_a, &nas()).unwrap().unwrap();
        create_nas_datastore(&mut registry, &sys_b, &nas()).unwrap().unwrap();

        remove_datastore(&mut registry, &sys_a, &ds, None).unwrap().unwrap();

        let record = registry.get_as::<Datastore>(&ds).unwrap();
        assert_eq!(record.host_count(), 1);
        assert!(!record.is_mounted_on(&host_a));
        assert!(registry.get_as::<HostSystem>(&host_a).unwrap().datastore.is_empty());

        let fault = remove_datastore(&mut registry, &sys_a, &ds, None).unwrap().unwrap_err();
        assert!(matches!(fault, MethodFault::NotFound { .. }));
    }

    #[test]
    fn test_destroy_local_datastore() {
        let mut registry = EntityRegistry::new();
        let (host, sys) = host(&mut registry, "esx01");
        let ds = create_local_datastore(&mut registry, &sys, "LocalDS_0", "/vmfs/volumes/local0")
            .unwrap()
            .unwrap();

        let dup = create_local_datastore(&mut registry, &sys, "LocalDS_0", "/tmp").unwrap();
        assert!(matches!(dup, Err(MethodFault::AlreadyExists { .. })));

        destroy_datastore(&mut registry, &sys, &ds, None).unwrap().unwrap();
        assert!(!registry.contains(&ds));
        assert!(registry.get_as::<HostSystem>(&host).unwrap().datastore.is_empty());
        assert!(registry.references_of_type(ManagedObjectType::Datastore).is_empty());
        assert!(matches!(
            registry.events().latest().map(|e| &e.kind),
            Some(EventKind::DatastoreDestroyed { .. })
        ));
    }

    #[test]
    fn test_destroy_in_use_datastore() {
        let mut registry = EntityRegistry::new();
        let (_host, sys) = host(&mut registry, "esx01");
        let ds = create_local_datastore(&mut registry, &sys, "LocalDS_0", "/vmfs/volumes/local0")
            .unwrap()
            .unwrap();
        let vm = registry.put(VirtualMachine::new("web01"));
        registry.get_as_mut::<Datastore>(&ds).unwrap().vm.push(vm);

        let fault = destroy_datastore(&mut registry, &sys, &ds, None).unwrap().unwrap_err();
        assert_eq!(fault, MethodFault::ResourceInUse { name: "LocalDS_0".to_string() });
        assert!(registry.contains(&ds));
    }
}
