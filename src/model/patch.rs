// Copyright (c) 2025 - Cowboy AI, Inc.
//! HostPatchManager Record

use serde::{Deserialize, Serialize};

use super::{Entity, EntityBase};
use crate::domain::{ManagedObjectReference, ManagedObjectType};

/// Per-host patch manager
///
/// `vibs` only ever grows, in installation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostPatchManager {
    #[serde(flatten)]
    pub base: EntityBase,
    pub host: ManagedObjectReference,
    pub vibs: Vec<String>,
}

impl HostPatchManager {
    pub fn new(host: ManagedObjectReference) -> Self {
        Self {
            base: EntityBase::new(ManagedObjectType::HostPatchManager, "patchManager"),
            host,
            vibs: Vec::new(),
        }
    }

    /// Append installed units, keeping order
    pub fn install<I>(&mut self, vibs: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.vibs.extend(vibs);
    }
}

impl Entity for HostPatchManager {
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
