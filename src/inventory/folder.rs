// Copyright (c) 2025 - Cowboy AI, Inc.
//! Folders and Datacenters

use tracing::debug;

use super::host::{create_standalone_host, HostConnectSpec};
use crate::domain::{ManagedObjectReference, ManagedObjectType};
use crate::errors::SimulatorResult;
use crate::events::EventKind;
use crate::model::{Datacenter, EntityBase, Folder, HostConnectionState, HostSystem};
use crate::registry::EntityRegistry;
use crate::task::{TaskWork, WorkOutcome};

/// Register the root folder (`group-d1`)
pub fn create_root_folder(registry: &mut EntityRegistry) -> ManagedObjectReference {
    let mut root = Folder::new(
        "Datacenters",
        vec![ManagedObjectType::Folder, ManagedObjectType::Datacenter],
    );
    root.base.self_ref = ManagedObjectReference::new(ManagedObjectType::Folder, "group-d1");
    registry.put(root)
}

/// Create a datacenter and its four inventory folders under `folder`
pub fn create_datacenter(
    registry: &mut EntityRegistry,
    folder: &ManagedObjectReference,
    name: &str,
) -> SimulatorResult<ManagedObjectReference> {
    let datacenter = registry.allocate_reference(ManagedObjectType::Datacenter);
    let folders = [
        registry.allocate_reference(ManagedObjectType::Folder),
        registry.allocate_reference(ManagedObjectType::Folder),
        registry.allocate_reference(ManagedObjectType::Folder),
        registry.allocate_reference(ManagedObjectType::Folder),
    ];
    put_datacenter(registry, folder, datacenter, name, folders)
}

/// Register a datacenter with fixed references for itself and its
/// host, vm, datastore and network folders
pub(crate) fn put_datacenter(
    registry: &mut EntityRegistry,
    parent: &ManagedObjectReference,
    reference: ManagedObjectReference,
    name: &str,
    folders: [ManagedObjectReference; 4],
) -> SimulatorResult<ManagedObjectReference> {
    use ManagedObjectType as Kind;

    let [host_folder, vm_folder, datastore_folder, network_folder] = folders;
    let layout = [
        (&host_folder, "host", vec![Kind::Folder, Kind::ComputeResource]),
        (
            &vm_folder,
            "vm",
            vec![Kind::Folder, Kind::VirtualMachine, Kind::VirtualApp],
        ),
        (&datastore_folder, "datastore", vec![Kind::Folder, Kind::Datastore]),
        (
            &network_folder,
            "network",
            vec![
                Kind::Folder,
                Kind::Network,
                Kind::DistributedVirtualPortgroup,
                Kind::VmwareDistributedVirtualSwitch,
            ],
        ),
    ];
    for (folder_ref, folder_name, child_type) in layout {
        let mut folder = Folder::new(folder_name, child_type);
        folder.base.self_ref = folder_ref.clone();
        registry.put_entity(&reference, folder);
    }

    let datacenter = Datacenter {
        base: EntityBase::with_reference(reference.clone(), name),
        host_folder,
        vm_folder,
        datastore_folder,
        network_folder,
    };
    let reference = registry.put_entity(parent, datacenter);
    registry
        .get_as_mut::<Folder>(parent)?
        .add_child(reference.clone());

    debug!(datacenter = %reference, name, "Datacenter created");
    Ok(reference)
}

/// `Folder.AddStandaloneHost_Task`
#[derive(Debug, Clone)]
pub struct AddStandaloneHostWork {
    pub folder: ManagedObjectReference,
    pub spec: HostConnectSpec,
    pub add_connected: bool,
}

impl TaskWork for AddStandaloneHostWork {
    fn target(&self) -> &ManagedObjectReference {
        &self.folder
    }

    fn description_id(&self) -> &'static str {
        "Folder.addStandaloneHost"
    }

    fn run(
        &mut self,
        registry: &mut EntityRegistry,
        task: &ManagedObjectReference,
    ) -> SimulatorResult<WorkOutcome> {
        let host = match create_standalone_host(registry, &self.folder, &self.spec)? {
            Ok(host) => host,
            Err(fault) => return Ok(Err(fault)),
        };

        if self.add_connected {
            registry.get_as_mut::<HostSystem>(&host)?.runtime.connection_state =
                HostConnectionState::Connected;
        }
        registry.record_event(&host, Some(task), EventKind::HostAdded);

        Ok(Ok(serde_json::to_value(&host)?))
    }
}
