// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compute Records: ComputeResource, ResourcePool, VirtualApp, VirtualMachine

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{clear_if, retain_without, Entity, EntityBase};
use crate::domain::{ManagedObjectReference, ManagedObjectType};

/// Standalone compute resource (one host + one root pool)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResource {
    #[serde(flatten)]
    pub base: EntityBase,
    pub host: Vec<ManagedObjectReference>,
    pub resource_pool: Option<ManagedObjectReference>,
}

impl ComputeResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(ManagedObjectType::ComputeResource, name),
            host: Vec::new(),
            resource_pool: None,
        }
    }
}

impl Entity for ComputeResource {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        self.host.iter().chain(self.resource_pool.iter()).collect()
    }

    fn detach_reference(&mut self, target: &ManagedObjectReference) {
        retain_without(&mut self.host, target);
        clear_if(&mut self.resource_pool, target);
    }
}

/// Resource pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePool {
    #[serde(flatten)]
    pub base: EntityBase,
    /// Compute resource this pool belongs to
    pub owner: Option<ManagedObjectReference>,
    /// Child pools and virtual apps
    pub resource_pool: Vec<ManagedObjectReference>,
    pub vm: Vec<ManagedObjectReference>,
}

impl ResourcePool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(ManagedObjectType::ResourcePool, name),
            owner: None,
            resource_pool: Vec::new(),
            vm: Vec::new(),
        }
    }

    /// Root pools hang directly off their compute resource
    pub fn is_root(&self) -> bool {
        self.base
            .parent
            .as_ref()
            .is_some_and(|p| p.kind() == ManagedObjectType::ComputeResource)
    }
}

impl Entity for ResourcePool {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        self.owner
            .iter()
            .chain(self.resource_pool.iter())
            .chain(self.vm.iter())
            .collect()
    }

    fn detach_reference(&mut self, target: &ManagedObjectReference) {
        clear_if(&mut self.owner, target);
        retain_without(&mut self.resource_pool, target);
        retain_without(&mut self.vm, target);
    }
}

/// Virtual application: a pool whose member VMs live and die with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualApp {
    #[serde(flatten)]
    pub base: EntityBase,
    pub owner: Option<ManagedObjectReference>,
    pub vm: Vec<ManagedObjectReference>,
}

impl VirtualApp {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(ManagedObjectType::VirtualApp, name),
            owner: None,
            vm: Vec::new(),
        }
    }
}

impl Entity for VirtualApp {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        self.owner.iter().chain(self.vm.iter()).collect()
    }

    fn detach_reference(&mut self, target: &ManagedObjectReference) {
        clear_if(&mut self.owner, target);
        retain_without(&mut self.vm, target);
    }
}

/// Virtual machine power state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VirtualMachinePowerState {
    PoweredOn,
    PoweredOff,
    Suspended,
}

impl fmt::Display for VirtualMachinePowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VirtualMachinePowerState::PoweredOn => write!(f, "poweredOn"),
            VirtualMachinePowerState::PoweredOff => write!(f, "poweredOff"),
            VirtualMachinePowerState::Suspended => write!(f, "suspended"),
        }
    }
}

/// VM runtime sub-record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineRuntimeInfo {
    pub power_state: VirtualMachinePowerState,
    pub host: Option<ManagedObjectReference>,
}

/// Virtual machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
    #[serde(flatten)]
    pub base: EntityBase,
    pub runtime: VirtualMachineRuntimeInfo,
    /// Pool or virtual app the VM draws resources from
    pub resource_pool: Option<ManagedObjectReference>,
    pub datastore: Vec<ManagedObjectReference>,
}

impl VirtualMachine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(ManagedObjectType::VirtualMachine, name),
            runtime: VirtualMachineRuntimeInfo {
                power_state: VirtualMachinePowerState::PoweredOff,
                host: None,
            },
            resource_pool: None,
            datastore: Vec::new(),
        }
    }
}

impl Entity for VirtualMachine {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        self.runtime
            .host
            .iter()
            .chain(self.resource_pool.iter())
            .chain(self.datastore.iter())
            .collect()
    }

    fn detach_reference(&mut self, target: &ManagedObjectReference) {
        clear_if(&mut self.runtime.host, target);
        clear_if(&mut self.resource_pool, target);
        retain_without(&mut self.datastore, target);
    }
}
