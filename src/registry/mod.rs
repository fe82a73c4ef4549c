// Copyright (c) 2025 - Cowboy AI, Inc.
//! Entity Registry
//!
//! The single authoritative map from [`ManagedObjectReference`] to entity.
//! There is no ambient global: every operation receives the registry it
//! works on, and the simulator owns one behind a [`SharedRegistry`].
//!
//! # Reference Allocation
//!
//! References are `<prefix>-<n>` with one monotonically increasing counter
//! per registry, so values never repeat across kinds:
//!
//! ```text
//! host-1, hostdatastoresystem-2, hostnetworksystem-3, hostpatchmanager-4, task-5
//! ```
//!
//! # Consistency
//!
//! A reference that is expected to resolve but does not is a fatal
//! [`SimulatorError::UnresolvedReference`], never a client fault. Removing an
//! entity does not cascade; callers detach links first or run
//! [`EntityRegistry::detach_references`] afterwards.

pub mod entity;

pub use entity::{EntityCast, ManagedEntity};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{ManagedObjectReference, ManagedObjectType};
use crate::errors::{SimulatorError, SimulatorResult};
use crate::events::{EventKind, EventLog, EventRecord};
use crate::model::{Entity, Task, TaskInfo};

/// Map of every registered entity
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<ManagedObjectReference, ManagedEntity>,
    counter: u64,
    events: EventLog,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose event history keeps at most `limit` records
    pub fn with_event_limit(limit: usize) -> Self {
        Self {
            events: EventLog::new(limit),
            ..Self::default()
        }
    }

    /// Allocate a fresh, unused reference of `kind`
    pub fn allocate_reference(&mut self, kind: ManagedObjectType) -> ManagedObjectReference {
        loop {
            self.counter += 1;
            let reference = ManagedObjectReference::new(
                kind,
                format!("{}-{}", kind.reference_prefix(), self.counter),
            );
            if !self.entities.contains_key(&reference) {
                return reference;
            }
        }
    }

    /// Register or re-register an entity
    ///
    /// An entity with an unset reference gets a fresh one; an entity whose
    /// reference is already registered replaces the previous record.
    pub fn put(&mut self, entity: impl Into<ManagedEntity>) -> ManagedObjectReference {
        let mut entity = entity.into();
        if entity.reference().is_unset() {
            let reference = self.allocate_reference(entity.kind());
            entity.base_mut().self_ref = reference;
        }

        let reference = entity.reference().clone();
        tracing::trace!(reference = %reference, name = entity.name(), "Registering entity");
        self.entities.insert(reference.clone(), entity);
        reference
    }

    /// Register an entity under a freshly allocated reference
    pub fn new_entity(&mut self, entity: impl Into<ManagedEntity>) -> ManagedObjectReference {
        let mut entity = entity.into();
        let reference = self.allocate_reference(entity.kind());
        entity.base_mut().self_ref = reference;
        self.put(entity)
    }

    /// Register an entity and record its parent
    pub fn put_entity(
        &mut self,
        parent: &ManagedObjectReference,
        entity: impl Into<ManagedEntity>,
    ) -> ManagedObjectReference {
        let mut entity = entity.into();
        entity.base_mut().parent = Some(parent.clone());
        self.put(entity)
    }

    /// Resolve a reference that must exist
    pub fn get(&self, reference: &ManagedObjectReference) -> SimulatorResult<&ManagedEntity> {
        self.entities
            .get(reference)
            .ok_or_else(|| SimulatorError::UnresolvedReference(reference.clone()))
    }

    pub fn get_mut(
        &mut self,
        reference: &ManagedObjectReference,
    ) -> SimulatorResult<&mut ManagedEntity> {
        self.entities
            .get_mut(reference)
            .ok_or_else(|| SimulatorError::UnresolvedReference(reference.clone()))
    }

    /// Resolve a reference a client supplied; absence is not an error here
    pub fn find(&self, reference: &ManagedObjectReference) -> Option<&ManagedEntity> {
        self.entities.get(reference)
    }

    /// Resolve a reference that must exist and hold a `T`
    pub fn get_as<T: EntityCast>(&self, reference: &ManagedObjectReference) -> SimulatorResult<&T> {
        let entity = self.get(reference)?;
        let actual = entity.kind();
        T::from_entity(entity).ok_or_else(|| SimulatorError::UnexpectedEntityType {
            reference: reference.clone(),
            expected: T::KIND,
            actual,
        })
    }

    pub fn get_as_mut<T: EntityCast>(
        &mut self,
        reference: &ManagedObjectReference,
    ) -> SimulatorResult<&mut T> {
        let entity = self.get_mut(reference)?;
        let actual = entity.kind();
        T::from_entity_mut(entity).ok_or_else(|| SimulatorError::UnexpectedEntityType {
            reference: reference.clone(),
            expected: T::KIND,
            actual,
        })
    }

    /// Deregister an entity; no cascade
    pub fn remove(&mut self, reference: &ManagedObjectReference) -> Option<ManagedEntity> {
        let removed = self.entities.remove(reference);
        if removed.is_some() {
            tracing::trace!(reference = %reference, "Removed entity");
        }
        removed
    }

    pub fn contains(&self, reference: &ManagedObjectReference) -> bool {
        self.entities.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ManagedObjectReference, &ManagedEntity)> {
        self.entities.iter()
    }

    /// All registered references of one kind
    pub fn references_of_type(&self, kind: ManagedObjectType) -> Vec<ManagedObjectReference> {
        self.entities
            .keys()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect()
    }

    /// Every `(holder, target)` pair where `holder` stores a link to an
    /// unregistered `target`
    pub fn dangling_references(&self) -> Vec<(ManagedObjectReference, ManagedObjectReference)> {
        let mut dangling = Vec::new();
        for (holder, entity) in &self.entities {
            let parent = entity.base().parent.as_ref();
            for target in parent.into_iter().chain(entity.linked_references()) {
                if !self.entities.contains_key(target) {
                    dangling.push((holder.clone(), target.clone()));
                }
            }
        }
        dangling
    }

    /// Drop every stored link to `target`, parent links included
    pub fn detach_references(&mut self, target: &ManagedObjectReference) {
        for entity in self.entities.values_mut() {
            entity.detach_reference(target);
            let base = entity.base_mut();
            if base.parent.as_ref() == Some(target) {
                base.parent = None;
            }
        }
    }

    /// Event history
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Append to the event history
    pub fn record_event(
        &mut self,
        host: &ManagedObjectReference,
        chain: Option<&ManagedObjectReference>,
        kind: EventKind,
    ) -> &EventRecord {
        self.events.record(host.clone(), chain.cloned(), kind)
    }

    /// Current info of a task
    pub fn task_info(&self, task: &ManagedObjectReference) -> SimulatorResult<TaskInfo> {
        Ok(self.get_as::<Task>(task)?.info.clone())
    }
}

/// Registry shared between the service surface and running tasks
///
/// Task execution takes the write lock for its whole run, so no reader ever
/// observes a half-applied task.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<EntityRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: EntityRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, EntityRegistry> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, EntityRegistry> {
        self.inner.write()
    }

    /// Current info of a task
    pub fn task_info(&self, task: &ManagedObjectReference) -> SimulatorResult<TaskInfo> {
        self.read().task_info(task)
    }
}
