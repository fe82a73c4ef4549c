// Copyright (c) 2025 - Cowboy AI, Inc.
//! Closed Set of Registry-Resident Entities
//!
//! [`ManagedEntity`] is the tagged variant stored by the registry. Typed
//! access goes through [`EntityCast`], which either yields the concrete
//! record or nothing; there is no unchecked downcast.

use serde::Serialize;

use crate::domain::{ManagedObjectReference, ManagedObjectType};
use crate::model::{
    ComputeResource, Datacenter, Datastore, DistributedVirtualPortgroup, Entity, EntityBase,
    Folder, HostDatastoreSystem, HostNetworkSystem, HostPatchManager, HostSystem, Network,
    ResourcePool, Task, VirtualApp, VirtualMachine, VmwareDistributedVirtualSwitch,
};

/// Safe conversion between a concrete record and [`ManagedEntity`]
pub trait EntityCast: Entity + Sized {
    /// Managed object type of this record
    const KIND: ManagedObjectType;

    fn from_entity(entity: &ManagedEntity) -> Option<&Self>;

    fn from_entity_mut(entity: &mut ManagedEntity) -> Option<&mut Self>;

    fn into_entity(self) -> ManagedEntity;
}

macro_rules! managed_entities {
    ($($variant:ident),+ $(,)?) => {
        /// Any registry-resident record
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(tag = "_typeName")]
        pub enum ManagedEntity {
            $($variant($variant),)+
        }

        impl ManagedEntity {
            /// Managed object type of the held record
            pub fn kind(&self) -> ManagedObjectType {
                match self {
                    $(ManagedEntity::$variant(_) => ManagedObjectType::$variant,)+
                }
            }

            pub fn as_entity(&self) -> &dyn Entity {
                match self {
                    $(ManagedEntity::$variant(e) => e,)+
                }
            }

            pub fn as_entity_mut(&mut self) -> &mut dyn Entity {
                match self {
                    $(ManagedEntity::$variant(e) => e,)+
                }
            }
        }

        $(
            impl EntityCast for $variant {
                const KIND: ManagedObjectType = ManagedObjectType::$variant;

                fn from_entity(entity: &ManagedEntity) -> Option<&Self> {
                    match entity {
                        ManagedEntity::$variant(e) => Some(e),
                        _ => None,
                    }
                }

                fn from_entity_mut(entity: &mut ManagedEntity) -> Option<&mut Self> {
                    match entity {
                        ManagedEntity::$variant(e) => Some(e),
                        _ => None,
                    }
                }

                fn into_entity(self) -> ManagedEntity {
                    ManagedEntity::$variant(self)
                }
            }

            impl From<$variant> for ManagedEntity {
                fn from(entity: $variant) -> Self {
                    ManagedEntity::$variant(entity)
                }
            }
        )+
    };
}

managed_entities!(
    Folder,
    Datacenter,
    HostSystem,
    ComputeResource,
    ResourcePool,
    VirtualApp,
    VirtualMachine,
    Datastore,
    Network,
    DistributedVirtualPortgroup,
    VmwareDistributedVirtualSwitch,
    HostDatastoreSystem,
    HostNetworkSystem,
    HostPatchManager,
    Task,
);

impl ManagedEntity {
    /// Concrete record, if the variant matches
    pub fn downcast_ref<T: EntityCast>(&self) -> Option<&T> {
        T::from_entity(self)
    }

    pub fn downcast_mut<T: EntityCast>(&mut self) -> Option<&mut T> {
        T::from_entity_mut(self)
    }
}

impl Entity for ManagedEntity {
    fn base(&self) -> &EntityBase {
        self.as_entity().base()
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        self.as_entity_mut().base_mut()
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        self.as_entity().linked_references()
    }

    fn detach_reference(&mut self, target: &ManagedObjectReference) {
        self.as_entity_mut().detach_reference(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_matches_variant() {
        let entity: ManagedEntity = HostSystem::template("esx01").into();
        assert_eq!(entity.kind(), ManagedObjectType::HostSystem);
        assert!(entity.downcast_ref::<HostSystem>().is_some());
        assert!(entity.downcast_ref::<VirtualMachine>().is_none());
    }

    #[test]
    fn test_entity_delegation() {
        let mut entity: ManagedEntity = VirtualMachine::new("web01").into();
        entity.base_mut().name = "web02".to_string();
        assert_eq!(entity.name(), "web02");
        assert_eq!(
            entity.downcast_ref::<VirtualMachine>().map(|vm| vm.base.name.as_str()),
            Some("web02")
        );
    }

    #[test]
    fn test_kind_constants() {
        assert_eq!(<Task as EntityCast>::KIND, ManagedObjectType::Task);
        assert_eq!(
            <VmwareDistributedVirtualSwitch as EntityCast>::KIND,
            ManagedObjectType::VmwareDistributedVirtualSwitch
        );
    }
}
