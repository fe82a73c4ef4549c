// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Containers: Folder and Datacenter

use serde::{Deserialize, Serialize};

use super::{push_unique, retain_without, Entity, EntityBase};
use crate::domain::{ManagedObjectReference, ManagedObjectType};

/// Inventory folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(flatten)]
    pub base: EntityBase,
    /// Types this folder may contain
    pub child_type: Vec<ManagedObjectType>,
    pub child_entity: Vec<ManagedObjectReference>,
}

impl Folder {
    pub fn new(name: impl Into<String>, child_type: Vec<ManagedObjectType>) -> Self {
        Self {
            base: EntityBase::new(ManagedObjectType::Folder, name),
            child_type,
            child_entity: Vec::new(),
        }
    }

    pub fn accepts(&self, kind: ManagedObjectType) -> bool {
        self.child_type.contains(&kind)
    }

    pub fn add_child(&mut self, child: ManagedObjectReference) {
        push_unique(&mut self.child_entity, child);
    }
}

impl Entity for Folder {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        self.child_entity.iter().collect()
    }

    fn detach_reference(&mut self, target: &ManagedObjectReference) {
        retain_without(&mut self.child_entity, target);
    }
}

/// Datacenter with its four inventory folders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datacenter {
    #[serde(flatten)]
    pub base: EntityBase,
    pub host_folder: ManagedObjectReference,
    pub vm_folder: ManagedObjectReference,
    pub datastore_folder: ManagedObjectReference,
    pub network_folder: ManagedObjectReference,
}

impl Entity for Datacenter {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        vec![
            &self.host_folder,
            &self.vm_folder,
            &self.datastore_folder,
            &self.network_folder,
        ]
    }
}
