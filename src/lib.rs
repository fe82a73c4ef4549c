// Copyright (c) 2025 - Cowboy AI, Inc.
//! Simulated vSphere inventory, task and host lifecycle engine
//!
//! This crate keeps an in-memory inventory of managed objects (hosts,
//! datastores, switches, virtual machines, ...) addressed by stable
//! references, runs every mutating operation as a task, and implements the
//! host lifecycle: maintenance mode, shutdown, patch installs and the
//! cascading destroy that releases a host together with everything attached
//! to it.
//!
//! # Layers
//!
//! - [`registry`] - the entity store and its shared, lock-protected handle
//! - [`task`] - task creation and execution
//! - [`inventory`] - factories and collaborator operations per entity kind
//! - [`lifecycle`] - maintenance mode and power transitions
//! - [`teardown`] - cascading host destroy
//! - [`service`] - the client-facing [`HostSystemService`]

pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod inventory;
pub mod lifecycle;
pub mod model;
pub mod registry;
pub mod service;
pub mod state_machine;
pub mod task;
pub mod teardown;
pub mod telemetry;

// Re-export commonly used types
pub use config::{SimulatorConfig, TeardownFailurePolicy};
pub use domain::{ManagedObjectReference, ManagedObjectType, MethodFault};
pub use errors::{SimulatorError, SimulatorResult};
pub use events::{EventKind, EventRecord};
pub use model::{TaskInfo, TaskInfoState};
pub use registry::{EntityRegistry, SharedRegistry};
pub use service::{HostSystemService, Simulator};
pub use task::{TaskExecution, TaskHandle, TaskRunner};
pub use teardown::{DestroyHostWork, TeardownReport};
