// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Pools and Virtual Apps
//!
//! Destroying a resource pool hands its child pools and VMs to the parent
//! pool. Destroying a virtual app destroys its VMs with it. Root pools
//! belong to their compute resource and cannot be destroyed directly.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::MethodResult;
use crate::domain::{ManagedObjectReference, ManagedObjectType, MethodFault};
use crate::errors::SimulatorResult;
use crate::model::{Entity, HostSystem, ResourcePool, VirtualApp, VirtualMachine};
use crate::registry::EntityRegistry;
use crate::task::{no_result, run_nested, TaskWork, WorkOutcome};

use super::virtual_machine::DestroyVmWork;

/// Request to create a child pool or virtual app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSpec {
    pub name: String,
    /// Parent resource pool
    pub parent: ManagedObjectReference,
    /// Host whose `vm` list should carry the new entity
    pub host: Option<ManagedObjectReference>,
}

impl PoolSpec {
    pub fn new(name: impl Into<String>, parent: ManagedObjectReference) -> Self {
        Self {
            name: name.into(),
            parent,
            host: None,
        }
    }

    pub fn on_host(mut self, host: ManagedObjectReference) -> Self {
        self.host = Some(host);
        self
    }
}

fn check_sibling_name(
    registry: &EntityRegistry,
    parent: &ResourcePool,
    name: &str,
) -> MethodResult<()> {
    if name.is_empty() {
        return Ok(Err(MethodFault::invalid_argument("name")));
    }
    for child in &parent.resource_pool {
        if registry.get(child)?.name() == name {
            return Ok(Err(MethodFault::AlreadyExists {
                name: name.to_string(),
            }));
        }
    }
    Ok(Ok(()))
}

fn link_child(
    registry: &mut EntityRegistry,
    spec: &PoolSpec,
    child: &ManagedObjectReference,
) -> SimulatorResult<()> {
    registry
        .get_as_mut::<ResourcePool>(&spec.parent)?
        .resource_pool
        .push(child.clone());
    if let Some(host) = &spec.host {
        registry.get_as_mut::<HostSystem>(host)?.vm.push(child.clone());
    }
    Ok(())
}

/// Create a child resource pool
pub fn create_resource_pool(
    registry: &mut EntityRegistry,
    spec: &PoolSpec,
) -> MethodResult<ManagedObjectReference> {
    let parent = registry.get_as::<ResourcePool>(&spec.parent)?;
    if let Err(fault) = check_sibling_name(registry, parent, &spec.name)? {
        return Ok(Err(fault));
    }

    let mut pool = ResourcePool::new(spec.name.as_str());
    pool.owner = parent.owner.clone();
    let pool = registry.put_entity(&spec.parent, pool);
    link_child(registry, spec, &pool)?;
    Ok(Ok(pool))
}

/// Create a virtual app under a resource pool
pub fn create_virtual_app(
    registry: &mut EntityRegistry,
    spec: &PoolSpec,
) -> MethodResult<ManagedObjectReference> {
    let parent = registry.get_as::<ResourcePool>(&spec.parent)?;
    if let Err(fault) = check_sibling_name(registry, parent, &spec.name)? {
        return Ok(Err(fault));
    }

    let mut vapp = VirtualApp::new(spec.name.as_str());
    vapp.owner = parent.owner.clone();
    let vapp = registry.put_entity(&spec.parent, vapp);
    link_child(registry, spec, &vapp)?;
    Ok(Ok(vapp))
}

/// `ResourcePool.Destroy_Task`
#[derive(Debug, Clone)]
pub struct DestroyResourcePoolWork {
    pub pool: ManagedObjectReference,
}

impl TaskWork for DestroyResourcePoolWork {
    fn target(&self) -> &ManagedObjectReference {
        &self.pool
    }

    fn description_id(&self) -> &'static str {
        "ResourcePool.destroy"
    }

    fn run(
        &mut self,
        registry: &mut EntityRegistry,
        _task: &ManagedObjectReference,
    ) -> SimulatorResult<WorkOutcome> {
        let pool = registry.get_as::<ResourcePool>(&self.pool)?;
        let parent = match &pool.base.parent {
            Some(parent) if parent.kind == ManagedObjectType::ResourcePool => parent.clone(),
            _ => return Ok(Err(MethodFault::invalid_argument("self"))),
        };
        let children = pool.resource_pool.clone();
        let vms = pool.vm.clone();
        let name = pool.name().to_string();

        for child in &children {
            registry.get_mut(child)?.base_mut().parent = Some(parent.clone());
        }
        for vm in &vms {
            registry.get_as_mut::<VirtualMachine>(vm)?.resource_pool = Some(parent.clone());
        }
        let parent_pool = registry.get_as_mut::<ResourcePool>(&parent)?;
        parent_pool.resource_pool.extend(children);
        parent_pool.vm.extend(vms);

        registry.remove(&self.pool);
        registry.detach_references(&self.pool);

        info!(pool = %self.pool, name = %name, parent = %parent, "Resource pool destroyed");
        no_result()
    }
}

/// `VirtualApp.Destroy_Task`
#[derive(Debug, Clone)]
pub struct DestroyVirtualAppWork {
    pub vapp: ManagedObjectReference,
}

impl TaskWork for DestroyVirtualAppWork {
    fn target(&self) -> &ManagedObjectReference {
        &self.vapp
    }

    fn description_id(&self) -> &'static str {
        "VirtualApp.destroy"
    }

    fn run(
        &mut self,
        registry: &mut EntityRegistry,
        _task: &ManagedObjectReference,
    ) -> SimulatorResult<WorkOutcome> {
        let vapp = registry.get_as::<VirtualApp>(&self.vapp)?;
        let name = vapp.name().to_string();

        for vm in vapp.vm.clone() {
            let info = run_nested(registry, DestroyVmWork { vm })?;
            if let Some(fault) = info.error() {
                return Ok(Err(fault.clone()));
            }
        }

        registry.remove(&self.vapp);
        registry.detach_references(&self.vapp);

        info!(vapp = %self.vapp, name = %name, "Virtual app destroyed");
        no_result()
    }
}
