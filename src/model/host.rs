// Copyright (c) 2025 - Cowboy AI, Inc.
//! HostSystem Record
//!
//! An ESX host. The three sub-managers referenced from [`HostConfigManager`]
//! are created with the host and removed with it; nothing else may create
//! or release them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{clear_if, retain_without, Entity, EntityBase};
use crate::domain::{ManagedObjectReference, ManagedObjectType};

/// Host power state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostPowerState {
    PoweredOn,
    PoweredOff,
}

impl fmt::Display for HostPowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostPowerState::PoweredOn => write!(f, "poweredOn"),
            HostPowerState::PoweredOff => write!(f, "poweredOff"),
        }
    }
}

/// Host connection state as seen by the management server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostConnectionState {
    Connected,
    Disconnected,
    NotResponding,
}

/// Host runtime sub-record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRuntimeInfo {
    pub connection_state: HostConnectionState,
    pub power_state: HostPowerState,
    pub in_maintenance_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_time: Option<DateTime<Utc>>,
}

impl Default for HostRuntimeInfo {
    fn default() -> Self {
        Self {
            connection_state: HostConnectionState::Connected,
            power_state: HostPowerState::PoweredOn,
            in_maintenance_mode: false,
            boot_time: None,
        }
    }
}

/// `summary.config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfigSummary {
    pub name: String,
    pub port: u16,
}

/// Host summary sub-record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostListSummary {
    pub config: HostConfigSummary,
}

/// References to the host's sub-managers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfigManager {
    pub datastore_system: Option<ManagedObjectReference>,
    pub network_system: Option<ManagedObjectReference>,
    pub patch_manager: Option<ManagedObjectReference>,
}

impl HostConfigManager {
    /// All sub-manager references that are set
    pub fn references(&self) -> Vec<&ManagedObjectReference> {
        [
            self.datastore_system.as_ref(),
            self.network_system.as_ref(),
            self.patch_manager.as_ref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Simulated ESX host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSystem {
    #[serde(flatten)]
    pub base: EntityBase,
    pub runtime: HostRuntimeInfo,
    pub summary: HostListSummary,
    pub config_manager: HostConfigManager,
    /// Virtual machines, virtual apps and pools placed on this host
    pub vm: Vec<ManagedObjectReference>,
    pub datastore: Vec<ManagedObjectReference>,
    pub network: Vec<ManagedObjectReference>,
}

impl HostSystem {
    /// Template for a freshly booted standalone ESX host
    pub fn template(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            base: EntityBase::new(ManagedObjectType::HostSystem, name.clone()),
            runtime: HostRuntimeInfo::default(),
            summary: HostListSummary {
                config: HostConfigSummary { name, port: 443 },
            },
            config_manager: HostConfigManager::default(),
            vm: Vec::new(),
            datastore: Vec::new(),
            network: Vec::new(),
        }
    }

    pub fn is_powered_on(&self) -> bool {
        self.runtime.power_state == HostPowerState::PoweredOn
    }
}

impl Entity for HostSystem {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        let mut refs = self.config_manager.references();
        refs.extend(self.vm.iter());
        refs.extend(self.datastore.iter());
        refs.extend(self.network.iter());
        refs
    }

    fn detach_reference(&mut self, target: &ManagedObjectReference) {
        clear_if(&mut self.config_manager.datastore_system, target);
        clear_if(&mut self.config_manager.network_system, target);
        clear_if(&mut self.config_manager.patch_manager, target);
        retain_without(&mut self.vm, target);
        retain_without(&mut self.datastore, target);
        retain_without(&mut self.network, target);
    }
}
