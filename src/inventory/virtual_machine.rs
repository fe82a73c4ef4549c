// Copyright (c) 2025 - Cowboy AI, Inc.
//! Virtual Machines

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::MethodResult;
use crate::domain::{ManagedObjectReference, ManagedObjectType, MethodFault};
use crate::errors::SimulatorResult;
use crate::model::{
    Datastore, Entity, Folder, HostSystem, ResourcePool, VirtualApp, VirtualMachine,
    VirtualMachinePowerState,
};
use crate::registry::EntityRegistry;
use crate::task::{no_result, TaskWork, WorkOutcome};

/// Placement of a new virtual machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmSpec {
    pub name: String,
    pub host: ManagedObjectReference,
    /// Resource pool or virtual app
    pub resource_pool: ManagedObjectReference,
    pub folder: Option<ManagedObjectReference>,
    pub datastore: Vec<ManagedObjectReference>,
    pub power_state: VirtualMachinePowerState,
}

impl VmSpec {
    pub fn new(
        name: impl Into<String>,
        host: ManagedObjectReference,
        resource_pool: ManagedObjectReference,
    ) -> Self {
        Self {
            name: name.into(),
            host,
            resource_pool,
            folder: None,
            datastore: Vec::new(),
            power_state: VirtualMachinePowerState::PoweredOff,
        }
    }

    pub fn with_datastore(mut self, datastore: ManagedObjectReference) -> Self {
        self.datastore.push(datastore);
        self
    }

    pub fn with_folder(mut self, folder: ManagedObjectReference) -> Self {
        self.folder = Some(folder);
        self
    }

    pub fn powered_on(mut self) -> Self {
        self.power_state = VirtualMachinePowerState::PoweredOn;
        self
    }
}

/// Create a virtual machine and link it to its host, pool, datastores and folder
pub fn create_vm(
    registry: &mut EntityRegistry,
    spec: &VmSpec,
) -> MethodResult<ManagedObjectReference> {
    if spec.name.is_empty() {
        return Ok(Err(MethodFault::invalid_argument("name")));
    }

    registry.get_as::<HostSystem>(&spec.host)?;
    match registry.get(&spec.resource_pool)?.kind() {
        ManagedObjectType::ResourcePool | ManagedObjectType::VirtualApp => {}
        _ => return Ok(Err(MethodFault::invalid_argument("pool"))),
    }
    for datastore in &spec.datastore {
        if !registry
            .get_as::<Datastore>(datastore)?
            .is_mounted_on(&spec.host)
        {
            return Ok(Err(MethodFault::invalid_argument("datastore")));
        }
    }

    let mut vm = VirtualMachine::new(spec.name.as_str());
    vm.runtime.host = Some(spec.host.clone());
    vm.runtime.power_state = spec.power_state;
    vm.resource_pool = Some(spec.resource_pool.clone());
    vm.datastore = spec.datastore.clone();

    let vm = match &spec.folder {
        Some(folder) => {
            registry.get_as::<Folder>(folder)?;
            let vm = registry.put_entity(folder, vm);
            registry.get_as_mut::<Folder>(folder)?.add_child(vm.clone());
            vm
        }
        None => registry.put(vm),
    };

    registry.get_as_mut::<HostSystem>(&spec.host)?.vm.push(vm.clone());
    match spec.resource_pool.kind {
        ManagedObjectType::VirtualApp => registry
            .get_as_mut::<VirtualApp>(&spec.resource_pool)?
            .vm
            .push(vm.clone()),
        _ => registry
            .get_as_mut::<ResourcePool>(&spec.resource_pool)?
            .vm
            .push(vm.clone()),
    }
    for datastore in &spec.datastore {
        registry.get_as_mut::<Datastore>(datastore)?.vm.push(vm.clone());
    }

    debug!(vm = %vm, host = %spec.host, name = %spec.name, "Virtual machine created");
    Ok(Ok(vm))
}

/// `VirtualMachine.Destroy_Task`
#[derive(Debug, Clone)]
pub struct DestroyVmWork {
    pub vm: ManagedObjectReference,
}

impl TaskWork for DestroyVmWork {
    fn target(&self) -> &ManagedObjectReference {
        &self.vm
    }

    fn description_id(&self) -> &'static str {
        "VirtualMachine.destroy"
    }

    fn run(
        &mut self,
        registry: &mut EntityRegistry,
        _task: &ManagedObjectReference,
    ) -> SimulatorResult<WorkOutcome> {
        let vm = registry.get_as::<VirtualMachine>(&self.vm)?;
        let power_state = vm.runtime.power_state;
        if power_state == VirtualMachinePowerState::PoweredOn {
            return Ok(Err(MethodFault::InvalidPowerState {
                requested: VirtualMachinePowerState::PoweredOff.to_string(),
                existing: power_state.to_string(),
            }));
        }
        let name = vm.name().to_string();

        registry.remove(&self.vm);
        registry.detach_references(&self.vm);

        info!(vm = %self.vm, name = %name, "Virtual machine destroyed");
        no_result()
    }
}
