// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for simulator internals
//!
//! These are *fatal* errors: they indicate a corrupted inventory graph or a
//! misuse of the task engine. Client-visible failures are never expressed
//! here; they travel as [`MethodFault`](crate::domain::MethodFault) values on
//! the task that produced them.

use thiserror::Error;

use crate::domain::{ManagedObjectReference, ManagedObjectType};

/// Errors that can occur inside the simulator engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulatorError {
    /// A reference expected to exist is not registered
    #[error("Unresolved reference: {0}")]
    UnresolvedReference(ManagedObjectReference),

    /// A reference resolved to an entity of another kind
    #[error("Reference {reference} resolved to {actual}, expected {expected}")]
    UnexpectedEntityType {
        reference: ManagedObjectReference,
        expected: ManagedObjectType,
        actual: ManagedObjectType,
    },

    /// A task was completed twice
    #[error("Task already completed: {0}")]
    TaskAlreadyCompleted(ManagedObjectReference),

    /// A spawned task went away without recording a terminal state
    #[error("Task abandoned before completion: {0}")]
    TaskAbandoned(ManagedObjectReference),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for simulator engine operations
pub type SimulatorResult<T> = Result<T, SimulatorError>;

impl From<serde_json::Error> for SimulatorError {
    fn from(err: serde_json::Error) -> Self {
        SimulatorError::Serialization(err.to_string())
    }
}
