// Copyright (c) 2025 - Cowboy AI, Inc.
//! Host Lifecycle Controller
//!
//! Maintenance mode and power transitions of a host, each run as one task.
//! The guard and the write happen in the same [`TaskWork::run`] call, so under
//! the registry's write lock a second concurrent request for the same
//! transition observes the new state and faults with `InvalidState`.
//!
//! | Work                       | Description id                      | From → To            |
//! |----------------------------|-------------------------------------|----------------------|
//! | [`EnterMaintenanceModeWork`] | `HostSystem.enterMaintenanceMode` | Off → On             |
//! | [`ExitMaintenanceModeWork`]  | `HostSystem.exitMaintenanceMode`  | On → Off             |
//! | [`ShutdownHostWork`]         | `HostSystem.shutdown`             | PoweredOn → PoweredOff |

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{ManagedObjectReference, MethodFault};
use crate::errors::SimulatorResult;
use crate::model::{Entity, HostSystem};
use crate::registry::EntityRegistry;
use crate::state_machine::{MaintenanceInput, MaintenanceMode, PowerInput, StateMachine};
use crate::task::{no_result, TaskWork, WorkOutcome};

fn check_timeout(timeout: i32) -> Result<(), MethodFault> {
    if timeout < 0 {
        return Err(MethodFault::invalid_argument("timeout"));
    }
    Ok(())
}

fn transition_maintenance(
    registry: &mut EntityRegistry,
    host_ref: &ManagedObjectReference,
    task: &ManagedObjectReference,
    input: MaintenanceInput,
) -> SimulatorResult<WorkOutcome> {
    let host = registry.get_as_mut::<HostSystem>(host_ref)?;
    let current = MaintenanceMode::from(host.runtime.in_maintenance_mode);

    let (next, event) = match current.transition(&input) {
        Ok(step) => step,
        Err(err) => {
            debug!(host = %host_ref, state = %current, input = %input, "Rejected: {}", err);
            return Ok(Err(err.into()));
        }
    };
    host.runtime.in_maintenance_mode = next.is_on();
    let name = host.name().to_string();

    registry.record_event(host_ref, Some(task), event);
    info!(host = %host_ref, name = %name, maintenance = %next, "Maintenance mode changed");
    no_result()
}

/// `HostSystem.EnterMaintenanceMode_Task`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterMaintenanceModeWork {
    pub host: ManagedObjectReference,
    /// Seconds; accepted but not waited on
    pub timeout: i32,
    pub evacuate_powered_off_vms: Option<bool>,
}

impl EnterMaintenanceModeWork {
    pub fn new(host: ManagedObjectReference) -> Self {
        Self {
            host,
            timeout: 0,
            evacuate_powered_off_vms: None,
        }
    }
}

impl TaskWork for EnterMaintenanceModeWork {
    fn target(&self) -> &ManagedObjectReference {
        &self.host
    }

    fn description_id(&self) -> &'static str {
        "HostSystem.enterMaintenanceMode"
    }

    fn run(
        &mut self,
        registry: &mut EntityRegistry,
        task: &ManagedObjectReference,
    ) -> SimulatorResult<WorkOutcome> {
        if let Err(fault) = check_timeout(self.timeout) {
            return Ok(Err(fault));
        }
        transition_maintenance(registry, &self.host, task, MaintenanceInput::Enter)
    }
}

/// `HostSystem.ExitMaintenanceMode_Task`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitMaintenanceModeWork {
    pub host: ManagedObjectReference,
    pub timeout: i32,
}

impl ExitMaintenanceModeWork {
    pub fn new(host: ManagedObjectReference) -> Self {
        Self { host, timeout: 0 }
    }
}

impl TaskWork for ExitMaintenanceModeWork {
    fn target(&self) -> &ManagedObjectReference {
        &self.host
    }

    fn description_id(&self) -> &'static str {
        "HostSystem.exitMaintenanceMode"
    }

    fn run(
        &mut self,
        registry: &mut EntityRegistry,
        task: &ManagedObjectReference,
    ) -> SimulatorResult<WorkOutcome> {
        if let Err(fault) = check_timeout(self.timeout) {
            return Ok(Err(fault));
        }
        transition_maintenance(registry, &self.host, task, MaintenanceInput::Exit)
    }
}

/// `HostSystem.ShutdownHost_Task`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShutdownHostWork {
    pub host: ManagedObjectReference,
    /// Shut down even outside maintenance mode; always honored
    pub force: bool,
}

impl ShutdownHostWork {
    pub fn new(host: ManagedObjectReference) -> Self {
        Self { host, force: false }
    }
}

impl TaskWork for ShutdownHostWork {
    fn target(&self) -> &ManagedObjectReference {
        &self.host
    }

    fn description_id(&self) -> &'static str {
        "HostSystem.shutdown"
    }

    fn run(
        &mut self,
        registry: &mut EntityRegistry,
        task: &ManagedObjectReference,
    ) -> SimulatorResult<WorkOutcome> {
        let host = registry.get_as_mut::<HostSystem>(&self.host)?;
        let current = host.runtime.power_state;

        let (next, event) = match current.transition(&PowerInput::Shutdown) {
            Ok(step) => step,
            Err(err) => {
                debug!(host = %self.host, state = %current, "Rejected: {}", err);
                return Ok(Err(err.into()));
            }
        };
        host.runtime.power_state = next;
        let name = host.name().to_string();

        registry.record_event(&self.host, Some(task), event);
        info!(host = %self.host, name = %name, force = self.force, "Host shut down");
        no_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::model::{HostPowerState, TaskInfoState};
    use crate::task::run_nested;

    fn setup() -> (EntityRegistry, ManagedObjectReference) {
        let mut registry = EntityRegistry::new();
        let host = registry.put(HostSystem::template("esx01"));
        (registry, host)
    }

    fn in_maintenance(registry: &EntityRegistry, host: &ManagedObjectReference) -> bool {
        registry
            .get_as::<HostSystem>(host)
            .unwrap()
            .runtime
            .in_maintenance_mode
    }

    #[test]
    fn test_enter_then_exit() {
        let (mut registry, host) = setup();

        let info = run_nested(&mut registry, EnterMaintenanceModeWork::new(host.clone())).unwrap();
        assert_eq!(info.state, TaskInfoState::Success);
        assert!(in_maintenance(&registry, &host));

        let event = registry.events().latest().unwrap();
        assert_eq!(event.kind, EventKind::EnteredMaintenanceMode);
        assert_eq!(event.chain.as_ref(), Some(&info.task));

        let info = run_nested(&mut registry, ExitMaintenanceModeWork::new(host.clone())).unwrap();
        assert_eq!(info.state, TaskInfoState::Success);
        assert!(!in_maintenance(&registry, &host));
    }

    #[test]
    fn test_guards_are_symmetric() {
        let (mut registry, host) = setup();

        let info = run_nested(&mut registry, ExitMaintenanceModeWork::new(host.clone())).unwrap();
        assert_eq!(info.error(), Some(&MethodFault::InvalidState));

        run_nested(&mut registry, EnterMaintenanceModeWork::new(host.clone())).unwrap();
        let info = run_nested(&mut registry, EnterMaintenanceModeWork::new(host.clone())).unwrap();
        assert_eq!(info.error(), Some(&MethodFault::InvalidState));
        assert!(in_maintenance(&registry, &host));
        assert_eq!(registry.events().len(), 1);
    }

    #[test]
    fn test_negative_timeout() {
        let (mut registry, host) = setup();
        let work = EnterMaintenanceModeWork {
            timeout: -1,
            ..EnterMaintenanceModeWork::new(host.clone())
        };
        let info = run_nested(&mut registry, work).unwrap();
        assert_eq!(info.error(), Some(&MethodFault::invalid_argument("timeout")));
        assert!(!in_maintenance(&registry, &host));
    }

    #[test]
    fn test_shutdown_once() {
        let (mut registry, host) = setup();

        let info = run_nested(&mut registry, ShutdownHostWork::new(host.clone())).unwrap();
        assert!(info.error().is_none());
        assert_eq!(
            registry.get_as::<HostSystem>(&host).unwrap().runtime.power_state,
            HostPowerState::PoweredOff
        );

        let info = run_nested(&mut registry, ShutdownHostWork::new(host)).unwrap();
        assert_eq!(info.error(), Some(&MethodFault::InvalidState));
    }

    #[test]
    fn test_missing_host_is_fatal() {
        let (mut registry, host) = setup();
        registry.remove(&host);
        // the task cannot even be created against a missing target
        assert!(run_nested(&mut registry, ShutdownHostWork::new(host)).is_err());
    }
}
