// Copyright (c) 2025 - Cowboy AI, Inc.
//! Storage Records: Datastore and HostDatastoreSystem

use serde::{Deserialize, Serialize};

use super::{retain_without, Entity, EntityBase};
use crate::domain::{ManagedObjectReference, ManagedObjectType};

/// Datastore file system type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatastoreType {
    #[serde(rename = "VMFS")]
    Vmfs,
    #[serde(rename = "NFS")]
    Nfs,
    #[serde(rename = "OTHER")]
    Local,
}

/// Datastore summary sub-record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatastoreSummary {
    pub url: String,
    pub capacity: u64,
    pub free_space: u64,
    #[serde(rename = "type")]
    pub kind: DatastoreType,
}

/// One host's mount of a datastore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatastoreHostMount {
    /// Mounting host
    pub key: ManagedObjectReference,
    /// Local mount path on that host
    pub path: String,
}

/// Datastore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datastore {
    #[serde(flatten)]
    pub base: EntityBase,
    pub summary: DatastoreSummary,
    pub host: Vec<DatastoreHostMount>,
    pub vm: Vec<ManagedObjectReference>,
}

impl Datastore {
    pub fn new(name: impl Into<String>, summary: DatastoreSummary) -> Self {
        Self {
            base: EntityBase::new(ManagedObjectType::Datastore, name),
            summary,
            host: Vec::new(),
            vm: Vec::new(),
        }
    }

    /// Number of hosts currently mounting this datastore
    pub fn host_count(&self) -> usize {
        self.host.len()
    }

    pub fn is_mounted_on(&self, host: &ManagedObjectReference) -> bool {
        self.host.iter().any(|m| &m.key == host)
    }

    /// Drop the mount of `host`; returns whether it was mounted
    pub fn unmount(&mut self, host: &ManagedObjectReference) -> bool {
        let before = self.host.len();
        self.host.retain(|m| &m.key != host);
        before != self.host.len()
    }
}

impl Entity for Datastore {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        self.host
            .iter()
            .map(|m| &m.key)
            .chain(self.vm.iter())
            .collect()
    }

    fn detach_reference(&mut self, target: &ManagedObjectReference) {
        self.unmount(target);
        retain_without(&mut self.vm, target);
    }
}

/// Per-host datastore manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDatastoreSystem {
    #[serde(flatten)]
    pub base: EntityBase,
    /// Host this manager belongs to
    pub host: ManagedObjectReference,
}

impl HostDatastoreSystem {
    pub fn new(host: ManagedObjectReference) -> Self {
        Self {
            base: EntityBase::new(ManagedObjectType::HostDatastoreSystem, "datastoreSystem"),
            host,
        }
    }
}

impl Entity for HostDatastoreSystem {
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
