// Copyright (c) 2025 - Cowboy AI, Inc.
//! Task Record
//!
//! A task is itself a registry entity: clients learn its reference from the
//! operation that created it and read `info` to observe the outcome.
//!
//! # Lifecycle
//!
//! ```text
//! Queued → Running → Success(result)
//!                  ↘ Error(fault)
//! ```
//!
//! Once terminal, a task never changes again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{clear_if, Entity, EntityBase};
use crate::domain::{ManagedObjectReference, MethodFault};
use crate::errors::{SimulatorError, SimulatorResult};

/// Task state as reported in `info.state`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskInfoState {
    Queued,
    Running,
    Success,
    Error,
}

impl TaskInfoState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

/// Terminal outcome: exactly one of result or fault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskOutcome {
    Success { result: serde_json::Value },
    Error { fault: MethodFault },
}

impl From<Result<serde_json::Value, MethodFault>> for TaskOutcome {
    fn from(outcome: Result<serde_json::Value, MethodFault>) -> Self {
        match outcome {
            Ok(result) => TaskOutcome::Success { result },
            Err(fault) => TaskOutcome::Error { fault },
        }
    }
}

/// Client-visible task information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub key: String,
    pub task: ManagedObjectReference,
    /// Operation identifier, e.g. `HostSystem.enterMaintenanceMode`
    pub description_id: String,
    /// Entity the task was constructed with; cleared if that entity is removed
    pub entity: Option<ManagedObjectReference>,
    pub entity_name: Option<String>,
    pub state: TaskInfoState,
    pub outcome: Option<TaskOutcome>,
    pub queue_time: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub complete_time: Option<DateTime<Utc>>,
}

impl TaskInfo {
    pub fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }

    /// Result value of a successful task
    pub fn result(&self) -> Option<&serde_json::Value> {
        match &self.outcome {
            Some(TaskOutcome::Success { result }) => Some(result),
            _ => None,
        }
    }

    /// Fault of a failed task
    pub fn error(&self) -> Option<&MethodFault> {
        match &self.outcome {
            Some(TaskOutcome::Error { fault }) => Some(fault),
            _ => None,
        }
    }

    /// Outcome as a `Result`, `None` while the task is still pending
    pub fn outcome(&self) -> Option<Result<&serde_json::Value, &MethodFault>> {
        self.outcome.as_ref().map(|o| match o {
            TaskOutcome::Success { result } => Ok(result),
            TaskOutcome::Error { fault } => Err(fault),
        })
    }
}

/// Task entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    pub base: EntityBase,
    pub info: TaskInfo,
}

impl Task {
    /// Create a queued task with an already allocated reference
    pub fn new(
        reference: ManagedObjectReference,
        description_id: impl Into<String>,
        entity: &ManagedObjectReference,
        entity_name: &str,
    ) -> Self {
        let description_id = description_id.into();
        Self {
            base: EntityBase::with_reference(reference.clone(), description_id.clone()),
            info: TaskInfo {
                key: reference.value.clone(),
                task: reference,
                description_id,
                entity: Some(entity.clone()),
                entity_name: Some(entity_name.to_string()),
                state: TaskInfoState::Queued,
                outcome: None,
                queue_time: Utc::now(),
                start_time: None,
                complete_time: None,
            },
        }
    }

    /// Mark the task as running
    pub fn start(&mut self) -> SimulatorResult<()> {
        if self.info.state != TaskInfoState::Queued {
            return Err(SimulatorError::TaskAlreadyCompleted(self.base.self_ref.clone()));
        }
        self.info.state = TaskInfoState::Running;
        self.info.start_time = Some(Utc::now());
        Ok(())
    }

    /// Record the terminal outcome
    pub fn complete(&mut self, outcome: TaskOutcome) -> SimulatorResult<()> {
        if self.info.is_complete() {
            return Err(SimulatorError::TaskAlreadyCompleted(self.base.self_ref.clone()));
        }
        self.info.state = match outcome {
            TaskOutcome::Success { .. } => TaskInfoState::Success,
            TaskOutcome::Error { .. } => TaskInfoState::Error,
        };
        self.info.outcome = Some(outcome);
        self.info.complete_time = Some(Utc::now());
        Ok(())
    }
}

impl Entity for Task {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn linked_references(&self) -> Vec<&ManagedObjectReference> {
        self.info.entity.iter().collect()
    }

    fn detach_reference(&mut self, target: &ManagedObjectReference) {
        clear_if(&mut self.info.entity, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManagedObjectType;

    fn task() -> Task {
        Task::new(
            ManagedObjectReference::new(ManagedObjectType::Task, "task-1"),
            "HostSystem.shutdown",
            &ManagedObjectReference::new(ManagedObjectType::HostSystem, "host-1"),
            "esx01",
        )
    }

    #[test]
    fn test_task_lifecycle() {
        let mut task = task();
        assert_eq!(task.info.state, TaskInfoState::Queued);

        task.start().unwrap();
        assert_eq!(task.info.state, TaskInfoState::Running);

        task.complete(TaskOutcome::Error {
            fault: MethodFault::InvalidState,
        })
        .unwrap();
        assert_eq!(task.info.state, TaskInfoState::Error);
        assert_eq!(task.info.error(), Some(&MethodFault::InvalidState));
        assert!(task.info.result().is_none());
        assert!(task.info.complete_time.is_some());
    }

    #[test]
    fn test_completed_task_is_immutable() {
        let mut task = task();
        task.start().unwrap();
        task.complete(TaskOutcome::Success {
            result: serde_json::Value::Null,
        })
        .unwrap();

        let again = task.complete(TaskOutcome::Error {
            fault: MethodFault::InvalidState,
        });
        assert!(matches!(again, Err(SimulatorError::TaskAlreadyCompleted(_))));
        assert_eq!(task.info.state, TaskInfoState::Success);
        assert!(task.start().is_err());
    }
}
