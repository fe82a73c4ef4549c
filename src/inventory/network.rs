// Copyright (c) 2025 - Cowboy AI, Inc.
//! Host Network System and Standard Networks
//!
//! Standard switches and portgroups live inside the host's network system
//! and are addressed by name, not by reference.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::MethodResult;
use crate::domain::{ManagedObjectReference, MethodFault, Mtu, PortCount, VlanId};
use crate::errors::SimulatorResult;
use crate::model::{Folder, HostNetworkSystem, HostPortGroup, HostVirtualSwitch, Network};
use crate::registry::EntityRegistry;

/// Request to add a standard virtual switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualSwitchSpec {
    pub vswitch_name: String,
    pub num_ports: Option<u32>,
    pub mtu: Option<u32>,
}

impl VirtualSwitchSpec {
    pub fn new(vswitch_name: impl Into<String>) -> Self {
        Self {
            vswitch_name: vswitch_name.into(),
            num_ports: None,
            mtu: None,
        }
    }
}

/// Request to add a standard portgroup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortGroupSpec {
    pub name: String,
    pub vswitch_name: String,
    pub vlan_id: u16,
}

/// Add a standard virtual switch
pub fn add_virtual_switch(
    registry: &mut EntityRegistry,
    network_system: &ManagedObjectReference,
    spec: &VirtualSwitchSpec,
) -> MethodResult<()> {
    if spec.vswitch_name.is_empty() {
        return Ok(Err(MethodFault::invalid_argument("vswitchName")));
    }
    let num_ports = match spec.num_ports.map(PortCount::new).transpose() {
        Ok(ports) => ports.unwrap_or_default(),
        Err(err) => return Ok(Err(err.to_fault())),
    };
    let mtu = match spec.mtu.map(Mtu::new).transpose() {
        Ok(mtu) => mtu.unwrap_or_default(),
        Err(err) => return Ok(Err(err.to_fault())),
    };

    let system = registry.get_as_mut::<HostNetworkSystem>(network_system)?;
    if system.network_info.find_vswitch(&spec.vswitch_name).is_some() {
        return Ok(Err(MethodFault::AlreadyExists {
            name: spec.vswitch_name.clone(),
        }));
    }

    system
        .network_info
        .vswitch
        .push(HostVirtualSwitch::new(spec.vswitch_name.as_str(), num_ports, mtu));
    debug!(network_system = %network_system, vswitch = %spec.vswitch_name, "Virtual switch added");
    Ok(Ok(()))
}

/// Remove a standard virtual switch and every portgroup on it
pub fn remove_virtual_switch(
    registry: &mut EntityRegistry,
    network_system: &ManagedObjectReference,
    vswitch_name: &str,
) -> MethodResult<()> {
    let system = registry.get_as_mut::<HostNetworkSystem>(network_system)?;
    let info = &mut system.network_info;

    let Some(index) = info.vswitch.iter().position(|vs| vs.name == vswitch_name) else {
        return Ok(Err(MethodFault::not_found(vswitch_name)));
    };

    info.vswitch.remove(index);
    info.portgroup.retain(|pg| pg.vswitch_name != vswitch_name);

    debug!(network_system = %network_system, vswitch = vswitch_name, "Virtual switch removed");
    Ok(Ok(()))
}

/// Add a standard portgroup to an existing switch
pub fn add_port_group(
    registry: &mut EntityRegistry,
    network_system: &ManagedObjectReference,
    spec: &PortGroupSpec,
) -> MethodResult<()> {
    let vlan_id = match VlanId::new(spec.vlan_id) {
        Ok(vlan_id) => vlan_id,
        Err(err) => return Ok(Err(err.to_fault())),
    };

    let system = registry.get_as_mut::<HostNetworkSystem>(network_system)?;
    let info = &mut system.network_info;

    if info.portgroup.iter().any(|pg| pg.name == spec.name) {
        return Ok(Err(MethodFault::AlreadyExists {
            name: spec.name.clone(),
        }));
    }
    let Some(vswitch) = info
        .vswitch
        .iter_mut()
        .find(|vs| vs.name == spec.vswitch_name)
    else {
        return Ok(Err(MethodFault::not_found(&spec.vswitch_name)));
    };

    let portgroup = HostPortGroup::new(spec.name.as_str(), spec.vswitch_name.as_str(), vlan_id);
    vswitch.portgroup.push(portgroup.key.clone());
    info.portgroup.push(portgroup);
    Ok(Ok(()))
}

/// Remove a standard portgroup by name
pub fn remove_port_group(
    registry: &mut EntityRegistry,
    network_system: &ManagedObjectReference,
    name: &str,
) -> MethodResult<()> {
    let system = registry.get_as_mut::<HostNetworkSystem>(network_system)?;
    let info = &mut system.network_info;

    let Some(index) = info.portgroup.iter().position(|pg| pg.name == name) else {
        return Ok(Err(MethodFault::not_found(name)));
    };

    let portgroup = info.portgroup.remove(index);
    for vswitch in &mut info.vswitch {
        vswitch.portgroup.retain(|key| key != &portgroup.key);
    }
    Ok(Ok(()))
}

/// Register a standard network in a network folder
pub fn create_network(
    registry: &mut EntityRegistry,
    folder: &ManagedObjectReference,
    name: &str,
) -> SimulatorResult<ManagedObjectReference> {
    registry.get_as::<Folder>(folder)?;
    let network = registry.put_entity(folder, Network::new(name));
    registry.get_as_mut::<Folder>(folder)?.add_child(network.clone());
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HostNetworkInfo, HostSystem};
    use crate::domain::ManagedObjectType;

    fn network_system() -> (EntityRegistry, ManagedObjectReference) {
        let mut registry = EntityRegistry::new();
        let host = registry.allocate_reference(ManagedObjectType::HostSystem);
        let ns = registry.put(HostNetworkSystem::new(host, HostNetworkInfo::esx_default()));
        (registry, ns)
    }

    fn info(registry: &EntityRegistry, ns: &ManagedObjectReference) -> HostNetworkInfo {
        registry
            .get_as::<HostNetworkSystem>(ns)
            .unwrap()
            .network_info
            .clone()
    }

    #[test]
    fn test_add_and_remove_virtual_switch() {
        let (mut registry, ns) = network_system();
        add_virtual_switch(&mut registry, &ns, &VirtualSwitchSpec::new("vSwitch1"))
            .unwrap()
            .unwrap();
        add_port_group(
            &mut registry,
            &ns,
            &PortGroupSpec {
                name: "Storage".to_string(),
                vswitch_name: "vSwitch1".to_string(),
                vlan_id: 20,
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(info(&registry, &ns).vswitch_names(), vec!["vSwitch0", "vSwitch1"]);

        remove_virtual_switch(&mut registry, &ns, "vSwitch1").unwrap().unwrap();
        let after = info(&registry, &ns);
        assert_eq!(after.vswitch_names(), vec!["vSwitch0"]);
        assert!(after.portgroup.iter().all(|pg| pg.name != "Storage"));
    }

    #[test]
    fn test_virtual_switch_faults() {
        let (mut registry, ns) = network_system();

        let fault = add_virtual_switch(&mut registry, &ns, &VirtualSwitchSpec::new("vSwitch0"))
            .unwrap()
            .unwrap_err();
        assert_eq!(fault, MethodFault::AlreadyExists { name: "vSwitch0".to_string() });

        let fault = remove_virtual_switch(&mut registry, &ns, "vSwitch9")
            .unwrap()
            .unwrap_err();
        assert_eq!(fault, MethodFault::not_found("vSwitch9"));

        let spec = VirtualSwitchSpec {
            mtu: Some(100),
            ..VirtualSwitchSpec::new("vSwitch2")
        };
        let fault = add_virtual_switch(&mut registry, &ns, &spec).unwrap().unwrap_err();
        assert_eq!(fault, MethodFault::invalid_argument("mtu"));
    }

    #[test]
    fn test_port_group_faults() {
        let (mut registry, ns) = network_system();
        let spec = PortGroupSpec {
            name: "VM Network".to_string(),
            vswitch_name: "vSwitch0".to_string(),
            vlan_id: 0,
        };
        let fault = add_port_group(&mut registry, &ns, &spec).unwrap().unwrap_err();
        assert!(matches!(fault, MethodFault::AlreadyExists { .. }));

        let spec = PortGroupSpec {
            name: "Trunk".to_string(),
            vswitch_name: "vSwitch0".to_string(),
            vlan_id: 5000,
        };
        let fault = add_port_group(&mut registry, &ns, &spec).unwrap().unwrap_err();
        assert_eq!(fault, MethodFault::invalid_argument("vlanId"));

        remove_port_group(&mut registry, &ns, "VM Network").unwrap().unwrap();
        let vswitch0 = info(&registry, &ns).vswitch[0].clone();
        assert_eq!(vswitch0.portgroup.len(), 1);
    }

    #[test]
    fn test_wrong_entity_is_fatal() {
        let mut registry = EntityRegistry::new();
        let host = registry.put(HostSystem::template("esx01"));
        assert!(remove_virtual_switch(&mut registry, &host, "vSwitch0").is_err());
    }
}
