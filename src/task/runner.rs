// Copyright (c) 2025 - Cowboy AI, Inc.
//! Task Runner
//!
//! Creates task entities and executes their work. Public operations go
//! through [`TaskRunner::submit`], which returns a [`TaskHandle`] as soon as
//! the task exists. Collaborator operations started from inside a running
//! task use [`run_nested`] and execute within the caller's lock scope.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::TaskWork;
use crate::domain::{ManagedObjectReference, ManagedObjectType, MethodFault};
use crate::errors::{SimulatorError, SimulatorResult};
use crate::model::{Entity, Task, TaskInfo, TaskOutcome};
use crate::registry::{EntityRegistry, SharedRegistry};

/// Where submitted work executes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskExecution {
    /// Before `submit` returns, on the calling thread
    #[default]
    Inline,

    /// On the tokio blocking pool; falls back to inline outside a runtime
    Spawned,
}

impl fmt::Display for TaskExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskExecution::Inline => write!(f, "inline"),
            TaskExecution::Spawned => write!(f, "spawned"),
        }
    }
}

impl FromStr for TaskExecution {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(TaskExecution::Inline),
            "spawned" => Ok(TaskExecution::Spawned),
            other => Err(SimulatorError::Configuration(format!(
                "unknown task execution mode '{other}'"
            ))),
        }
    }
}

/// Register a queued task bound to the work's target
pub fn create_task(
    registry: &mut EntityRegistry,
    work: &dyn TaskWork,
) -> SimulatorResult<ManagedObjectReference> {
    let target = work.target();
    let entity_name = registry.get(target)?.name().to_string();

    let reference = registry.allocate_reference(ManagedObjectType::Task);
    registry.put(Task::new(
        reference.clone(),
        work.description_id(),
        target,
        &entity_name,
    ));

    debug!(
        task = %reference,
        description_id = work.description_id(),
        entity = %target,
        "Task created"
    );
    Ok(reference)
}

/// Run a queued task to completion
///
/// Records `Running`, executes the work once, then records the terminal
/// outcome. A fatal error from the work is recorded as `SystemError` and
/// returned.
pub fn run_task(
    registry: &mut EntityRegistry,
    task: &ManagedObjectReference,
    work: &mut dyn TaskWork,
) -> SimulatorResult<TaskInfo> {
    registry.get_as_mut::<Task>(task)?.start()?;

    let (outcome, fatal) = match work.run(registry, task) {
        Ok(Ok(result)) => {
            info!(task = %task, description_id = work.description_id(), "Task succeeded");
            (TaskOutcome::Success { result }, None)
        }
        Ok(Err(fault)) => {
            info!(
                task = %task,
                description_id = work.description_id(),
                fault = fault.name(),
                "Task failed: {}",
                fault
            );
            (TaskOutcome::Error { fault }, None)
        }
        Err(err) => {
            error!(
                task = %task,
                description_id = work.description_id(),
                error = %err,
                "Task aborted by internal error"
            );
            let fault = MethodFault::SystemError {
                reason: err.to_string(),
            };
            (TaskOutcome::Error { fault }, Some(err))
        }
    };

    let entity = registry.get_as_mut::<Task>(task)?;
    entity.complete(outcome)?;
    let info = entity.info.clone();

    match fatal {
        Some(err) => Err(err),
        None => Ok(info),
    }
}

/// Create and run a collaborator task inside the current lock scope
pub fn run_nested<W: TaskWork>(
    registry: &mut EntityRegistry,
    mut work: W,
) -> SimulatorResult<TaskInfo> {
    let task = create_task(registry, &work)?;
    run_task(registry, &task, &mut work)
}

/// Handle to a submitted task
#[derive(Debug)]
pub struct TaskHandle {
    reference: ManagedObjectReference,
    receiver: watch::Receiver<Option<TaskInfo>>,
}

impl TaskHandle {
    /// Reference of the task
    pub fn reference(&self) -> &ManagedObjectReference {
        &self.reference
    }

    /// Terminal info, if the task already completed
    pub fn try_info(&self) -> Option<TaskInfo> {
        self.receiver.borrow().clone()
    }

    /// Wait for the terminal info
    pub async fn wait(mut self) -> SimulatorResult<TaskInfo> {
        let reference = self.reference.clone();
        let info = self
            .receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| SimulatorError::TaskAbandoned(reference.clone()))?;
        (*info).clone().ok_or(SimulatorError::TaskAbandoned(reference))
    }
}

/// Submits work as tasks against a shared registry
#[derive(Debug, Clone)]
pub struct TaskRunner {
    registry: SharedRegistry,
    execution: TaskExecution,
}

impl TaskRunner {
    pub fn new(registry: SharedRegistry, execution: TaskExecution) -> Self {
        Self {
            registry,
            execution,
        }
    }

    pub fn execution(&self) -> TaskExecution {
        self.execution
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Create a task for `work` and start executing it
    ///
    /// In inline mode the task is complete when this returns, and a fatal
    /// error from the work is returned here. In spawned mode fatal errors
    /// are logged and the handle still resolves to the recorded info.
    pub fn submit<W: TaskWork>(&self, work: W) -> SimulatorResult<TaskHandle> {
        let reference = {
            let mut registry = self.registry.write();
            create_task(&mut registry, &work)?
        };
        let (sender, receiver) = watch::channel(None);

        match self.execution {
            TaskExecution::Inline => {
                let info = execute(&self.registry, &reference, work)?;
                sender.send_replace(Some(info));
            }
            TaskExecution::Spawned => match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    let registry = self.registry.clone();
                    let task = reference.clone();
                    runtime.spawn_blocking(move || {
                        let info = match execute(&registry, &task, work) {
                            Ok(info) => Some(info),
                            Err(err) => {
                                error!(task = %task, error = %err, "Spawned task failed");
                                registry.task_info(&task).ok()
                            }
                        };
                        sender.send_replace(info);
                    });
                }
                Err(_) => {
                    warn!(task = %reference, "No tokio runtime available, running task inline");
                    let info = execute(&self.registry, &reference, work)?;
                    sender.send_replace(Some(info));
                }
            },
        }

        Ok(TaskHandle {
            reference,
            receiver,
        })
    }
}

fn execute<W: TaskWork>(
    registry: &SharedRegistry,
    task: &ManagedObjectReference,
    mut work: W,
) -> SimulatorResult<TaskInfo> {
    let mut registry = registry.write();
    run_task(&mut registry, task, &mut work)
}
