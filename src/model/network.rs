// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Records
//!
//! Standard networks and distributed portgroups are inventory entities; the
//! per-host [`HostNetworkSystem`] keeps the host's standard virtual switches
//! and portgroups as plain sub-records, the way the API reports them in
//! `networkInfo`.

use serde::{Deserialize, Serialize};

use super::{clear_if, retain_without, Entity, EntityBase};
use crate::domain::{ManagedObjectReference, ManagedObjectType, Mtu, PortCount, VlanId};

/// Standard virtual switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostVirtualSwitch {
    pub name: String,
    pub key: String,
    pub num_ports: PortCount,
    pub mtu: Mtu,
    /// Keys of the portgroups attached to this switch
    pub portgroup: Vec<String>,
}

impl HostVirtualSwitch {
    pub fn new(name: impl Into<String>, num_ports: PortCount, mtu: Mtu) -> Self {
        let name = name.into();
        Self {
            key: format!("key-vim.host.VirtualSwitch-{name}"),
            name,
            num_ports,
            mtu,
            portgroup: Vec::new(),
        }
    }
}

/// Standard portgroup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostPortGroup {
    pub key: String,
    pub name: String,
    pub vlan_id: VlanId,
    pub vswitch_name: String,
}

impl HostPortGroup {
    pub fn new(name: impl Into<String>, vswitch_name: impl Into<String>, vlan_id: VlanId) -> Self {
        let name = name.into();
        Self {
            key: format!("key-vim.host.PortGroup-{name}"),
            name,
            vlan_id,
            vswitch_name: vswitch_name.into(),
        }
    }
}

/// `networkInfo` of a host network system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostNetworkInfo {
    pub vswitch: Vec<HostVirtualSwitch>,
    pub portgroup: Vec<HostPortGroup>,
}

impl HostNetworkInfo {
    /// Layout of a freshly installed ESX host
    pub fn esx_default() -> Self {
        let mut vswitch = HostVirtualSwitch::new("vSwitch0", PortCount::default(), Mtu::default());
        let portgroup = vec![
            HostPortGroup::new("VM Network", "vSwitch0", VlanId::NONE),
            HostPortGroup::new("Management Network", "vSwitch0", VlanId::NONE),
        ];
        vswitch.portgroup = portgroup.iter().map(|pg| pg.key.clone()).collect();
        Self {
            vswitch: vec![vswitch],
            portgroup,
        }
    }

    pub fn find_vswitch(&self, name: &str) -> Option<&HostVirtualSwitch> {
        self.vswitch.iter().find(|vs| vs.name == name)
    }

    pub fn vswitch_names(&self) -> Vec<String> {
        self.vswitch.iter().map(|vs| vs.name.clone()).collect()
    }
}

/// Per-host network manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostNetworkSystem {
    #[serde(flatten)]
    pub base: EntityBase,
    pub host: ManagedObjectReference,
    pub network_info: HostNetworkInfo,
}

impl HostNetworkSystem {
    pub fn new(host: ManagedObjectReference, network_info: HostNetworkInfo) -> Self {
        Self {
            base: EntityBase::new(ManagedObjectType::HostNetworkSystem, "networkSystem"),
            host,
            network_info,
        }
    }
}

impl Entity for HostNetworkSystem {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        vec![&self.host]
    }
}

/// Standard network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    #[serde(flatten)]
    pub base: EntityBase,
    pub host: Vec<ManagedObjectReference>,
    pub vm: Vec<ManagedObjectReference>,
}

impl Network {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(ManagedObjectType::Network, name),
            host: Vec::new(),
            vm: Vec::new(),
        }
    }
}

impl Entity for Network {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        self.host.iter().chain(self.vm.iter()).collect()
    }

    fn detach_reference(&mut self, target: &ManagedObjectReference) {
        retain_without(&mut self.host, target);
        retain_without(&mut self.vm, target);
    }
}

/// Distributed portgroup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributedVirtualPortgroup {
    #[serde(flatten)]
    pub base: EntityBase,
    /// Owning switch (`config.distributedVirtualSwitch`)
    pub distributed_virtual_switch: Option<ManagedObjectReference>,
    pub host: Vec<ManagedObjectReference>,
    pub vm: Vec<ManagedObjectReference>,
}

impl DistributedVirtualPortgroup {
    pub fn new(name: impl Into<String>, dvs: ManagedObjectReference) -> Self {
        Self {
            base: EntityBase::new(ManagedObjectType::DistributedVirtualPortgroup, name),
            distributed_virtual_switch: Some(dvs),
            host: Vec::new(),
            vm: Vec::new(),
        }
    }
}

impl Entity for DistributedVirtualPortgroup {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        self.distributed_virtual_switch
            .iter()
            .chain(self.host.iter())
            .chain(self.vm.iter())
            .collect()
    }

    fn detach_reference(&mut self, target: &ManagedObjectReference) {
        clear_if(&mut self.distributed_virtual_switch, target);
        retain_without(&mut self.host, target);
        retain_without(&mut self.vm, target);
    }
}

/// Host membership of a distributed switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributedVirtualSwitchHostMember {
    pub host: ManagedObjectReference,
}

/// `config` of a distributed switch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DvsConfigInfo {
    /// Bumped on every successful reconfigure
    pub config_version: u64,
    pub host: Vec<DistributedVirtualSwitchHostMember>,
}

/// Distributed virtual switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmwareDistributedVirtualSwitch {
    #[serde(flatten)]
    pub base: EntityBase,
    pub config: DvsConfigInfo,
    pub portgroup: Vec<ManagedObjectReference>,
}

impl VmwareDistributedVirtualSwitch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(ManagedObjectType::VmwareDistributedVirtualSwitch, name),
            config: DvsConfigInfo::default(),
            portgroup: Vec::new(),
        }
    }

    pub fn has_member(&self, host: &ManagedObjectReference) -> bool {
        self.config.host.iter().any(|m| &m.host == host)
    }

    pub fn members(&self) -> Vec<&ManagedObjectReference> {
        self.config.host.iter().map(|m| &m.host).collect()
    }
}

impl Entity for VmwareDistributedVirtualSwitch {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        self.config
            .host
            .iter()
            .map(|m| &m.host)
            .chain(self.portgroup.iter())
            .collect()
    }

    fn detach_reference(&mut self, target: &ManagedObjectReference) {
        self.config.host.retain(|m| &m.host != target);
        retain_without(&mut self.portgroup, target);
    }
}
