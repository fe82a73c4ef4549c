// Copyright (c) 2025 - Cowboy AI, Inc.
//! Managed Object Reference
//!
//! The opaque, stable identifier every client uses to address an entity.
//! A reference is a `(type, value)` pair; two references are the same entity
//! only if both parts match.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ManagedObjectType;

/// Reference to a registry-resident entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ManagedObjectReference {
    /// Managed object type
    #[serde(rename = "type")]
    pub kind: ManagedObjectType,

    /// Opaque value, unique within the registry (`host-12`)
    pub value: String,
}

impl ManagedObjectReference {
    /// Create a reference with an explicit value
    pub fn new(kind: ManagedObjectType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// A reference with no value yet; the registry allocates one on `put`
    pub fn unset(kind: ManagedObjectType) -> Self {
        Self {
            kind,
            value: String::new(),
        }
    }

    /// Whether the value still needs to be allocated
    pub fn is_unset(&self) -> bool {
        self.value.is_empty()
    }

    /// Referenced type
    pub fn kind(&self) -> ManagedObjectType {
        self.kind
    }

    /// Referenced value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ManagedObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let r = ManagedObjectReference::new(ManagedObjectType::HostSystem, "host-12");
        assert_eq!(r.to_string(), "HostSystem:host-12");
    }

    #[test]
    fn test_unset() {
        let r = ManagedObjectReference::unset(ManagedObjectType::Datastore);
        assert!(r.is_unset());
        assert!(!ManagedObjectReference::new(ManagedObjectType::Datastore, "datastore-1").is_unset());
    }

    #[test]
    fn test_serde_uses_type_field() {
        let r = ManagedObjectReference::new(ManagedObjectType::Task, "task-3");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["type"], "Task");
        assert_eq!(json["value"], "task-3");
    }
}
