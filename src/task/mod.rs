// Copyright (c) 2025 - Cowboy AI, Inc.
//! Task Engine
//!
//! Every mutating operation is expressed as a [`TaskWork`]: a unit of work
//! bound to a target entity. The runner wraps it in a [`Task`] entity, runs
//! it exactly once under the registry's write lock and records the terminal
//! outcome on the task.
//!
//! # Outcomes
//!
//! ```text
//! TaskWork::run
//!   ├─ Ok(Ok(value))   → Task.info: Success(value)
//!   ├─ Ok(Err(fault))  → Task.info: Error(fault)          client-visible
//!   └─ Err(error)      → Task.info: Error(SystemError)    fatal, propagated
//! ```
//!
//! [`Task`]: crate::model::Task

pub mod runner;

pub use runner::{create_task, run_nested, run_task, TaskExecution, TaskHandle, TaskRunner};

use crate::domain::{ManagedObjectReference, MethodFault};
use crate::errors::SimulatorResult;
use crate::registry::EntityRegistry;

/// Result value or client-visible fault of one unit of work
pub type WorkOutcome = Result<serde_json::Value, MethodFault>;

/// A unit of work executed as a task
pub trait TaskWork: Send + 'static {
    /// Entity the task is constructed with
    fn target(&self) -> &ManagedObjectReference;

    /// Operation identifier, e.g. `HostSystem.destroy`
    fn description_id(&self) -> &'static str;

    /// Execute the work
    ///
    /// `task` is the reference of the task running this work; events use it
    /// as their causing chain.
    fn run(
        &mut self,
        registry: &mut EntityRegistry,
        task: &ManagedObjectReference,
    ) -> SimulatorResult<WorkOutcome>;
}

/// Successful outcome with no result value
pub fn no_result() -> SimulatorResult<WorkOutcome> {
    Ok(Ok(serde_json::Value::Null))
}
