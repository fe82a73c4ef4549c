// Copyright (c) 2025 - Cowboy AI, Inc.
//! Distributed Virtual Switches
//!
//! Host membership is kept aligned in three places: the switch's
//! `config.host`, each of its portgroups' `host` list, and each member
//! host's `network` list. Reconfiguration validates the whole spec before
//! applying any of it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{ManagedObjectReference, ManagedObjectType, MethodFault};
use crate::errors::SimulatorResult;
use crate::events::EventKind;
use crate::model::{
    DistributedVirtualPortgroup, DistributedVirtualSwitchHostMember, Entity, Folder, HostSystem,
    VmwareDistributedVirtualSwitch,
};
use crate::registry::EntityRegistry;
use crate::task::{no_result, TaskWork, WorkOutcome};

/// Member operation of a reconfigure request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigSpecOperation {
    Add,
    Remove,
}

/// One host member change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DvsHostMemberConfigSpec {
    pub operation: ConfigSpecOperation,
    pub host: ManagedObjectReference,
}

/// Reconfigure request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DvsConfigSpec {
    pub host: Vec<DvsHostMemberConfigSpec>,
}

impl DvsConfigSpec {
    pub fn add_host(host: ManagedObjectReference) -> Self {
        Self {
            host: vec![DvsHostMemberConfigSpec {
                operation: ConfigSpecOperation::Add,
                host,
            }],
        }
    }

    pub fn remove_host(host: ManagedObjectReference) -> Self {
        Self {
            host: vec![DvsHostMemberConfigSpec {
                operation: ConfigSpecOperation::Remove,
                host,
            }],
        }
    }
}

/// Create a distributed switch in a network folder
pub fn create_dvs(
    registry: &mut EntityRegistry,
    folder: &ManagedObjectReference,
    name: &str,
) -> SimulatorResult<ManagedObjectReference> {
    registry.get_as::<Folder>(folder)?;
    let dvs = registry.put_entity(folder, VmwareDistributedVirtualSwitch::new(name));
    registry.get_as_mut::<Folder>(folder)?.add_child(dvs.clone());
    debug!(dvs = %dvs, name, "Distributed switch created");
    Ok(dvs)
}

/// Create a portgroup on a distributed switch, visible to its current members
pub fn create_dvs_portgroup(
    registry: &mut EntityRegistry,
    dvs: &ManagedObjectReference,
    name: &str,
) -> SimulatorResult<ManagedObjectReference> {
    let switch = registry.get_as::<VmwareDistributedVirtualSwitch>(dvs)?;
    let members: Vec<ManagedObjectReference> = switch.members().into_iter().cloned().collect();
    let folder = switch.base.parent.clone();

    let mut portgroup = DistributedVirtualPortgroup::new(name, dvs.clone());
    portgroup.host = members.clone();
    let portgroup = match &folder {
        Some(folder) => {
            let portgroup = registry.put_entity(folder, portgroup);
            registry.get_as_mut::<Folder>(folder)?.add_child(portgroup.clone());
            portgroup
        }
        None => registry.put(portgroup),
    };

    registry
        .get_as_mut::<VmwareDistributedVirtualSwitch>(dvs)?
        .portgroup
        .push(portgroup.clone());
    for host in &members {
        registry
            .get_as_mut::<HostSystem>(host)?
            .network
            .push(portgroup.clone());
    }
    Ok(portgroup)
}

/// `DistributedVirtualSwitch.ReconfigureDvs_Task`
#[derive(Debug, Clone)]
pub struct ReconfigureDvsWork {
    pub dvs: ManagedObjectReference,
    pub spec: DvsConfigSpec,
}

impl ReconfigureDvsWork {
    fn validate(&self, registry: &EntityRegistry) -> SimulatorResult<Result<(), MethodFault>> {
        let switch = registry.get_as::<VmwareDistributedVirtualSwitch>(&self.dvs)?;
        let mut members: Vec<&ManagedObjectReference> = switch.members();

        for change in &self.spec.host {
            let Some(host) = registry.find(&change.host) else {
                return Ok(Err(MethodFault::not_found(&change.host)));
            };
            if host.kind() != ManagedObjectType::HostSystem {
                return Ok(Err(MethodFault::invalid_argument("host")));
            }

            let is_member = members.contains(&&change.host);
            match change.operation {
                ConfigSpecOperation::Add if is_member => {
                    return Ok(Err(MethodFault::AlreadyExists {
                        name: host.name().to_string(),
                    }));
                }
                ConfigSpecOperation::Add => members.push(&change.host),
                ConfigSpecOperation::Remove if !is_member => {
                    return Ok(Err(MethodFault::not_found(&change.host)));
                }
                ConfigSpecOperation::Remove => members.retain(|m| *m != &change.host),
            }
        }
        Ok(Ok(()))
    }
}

impl TaskWork for ReconfigureDvsWork {
    fn target(&self) -> &ManagedObjectReference {
        &self.dvs
    }

    fn description_id(&self) -> &'static str {
        "DistributedVirtualSwitch.reconfigure"
    }

    fn run(
        &mut self,
        registry: &mut EntityRegistry,
        task: &ManagedObjectReference,
    ) -> SimulatorResult<WorkOutcome> {
        if let Err(fault) = self.validate(registry)? {
            return Ok(Err(fault));
        }

        let (name, portgroups) = {
            let switch = registry.get_as::<VmwareDistributedVirtualSwitch>(&self.dvs)?;
            (switch.name().to_string(), switch.portgroup.clone())
        };

        for change in &self.spec.host {
            let host = &change.host;
            let switch = registry.get_as_mut::<VmwareDistributedVirtualSwitch>(&self.dvs)?;
            let event = match change.operation {
                ConfigSpecOperation::Add => {
                    switch
                        .config
                        .host
                        .push(DistributedVirtualSwitchHostMember { host: host.clone() });
                    for portgroup in &portgroups {
                        registry
                            .get_as_mut::<DistributedVirtualPortgroup>(portgroup)?
                            .host
                            .push(host.clone());
                        registry
                            .get_as_mut::<HostSystem>(host)?
                            .network
                            .push(portgroup.clone());
                    }
                    EventKind::DvsHostJoined {
                        dvs: self.dvs.clone(),
                        name: name.clone(),
                    }
                }
                ConfigSpecOperation::Remove => {
                    switch.config.host.retain(|m| &m.host != host);
                    for portgroup in &portgroups {
                        registry
                            .get_as_mut::<DistributedVirtualPortgroup>(portgroup)?
                            .host
                            .retain(|h| h != host);
                        registry
                            .get_as_mut::<HostSystem>(host)?
                            .network
                            .retain(|n| n != portgroup);
                    }
                    EventKind::DvsHostLeft {
                        dvs: self.dvs.clone(),
                        name: name.clone(),
                    }
                }
            };
            registry.record_event(host, Some(task), event);
        }

        registry
            .get_as_mut::<VmwareDistributedVirtualSwitch>(&self.dvs)?
            .config
            .config_version += 1;

        info!(dvs = %self.dvs, changes = self.spec.host.len(), "Distributed switch reconfigured");
        no_result()
    }
}
