// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for the Simulated Host API
//!
//! The public surface clients call. Every mutating method builds the matching
//! [`TaskWork`], submits it to the [`TaskRunner`] and returns the
//! [`TaskHandle`] at once; callers read the outcome from the task.
//!
//! # Architecture
//!
//! ```text
//! Client Request (this = target)
//!     ↓
//! HostSystemService (this module)
//!     ↓
//! TaskRunner::submit → Task entity (queued)
//!     ↓
//! TaskWork::run under the registry write lock
//!     ↓
//! Task entity (success | error) + event history
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cim_vsphere_sim::service::*;
//! use cim_vsphere_sim::SimulatorConfig;
//!
//! let simulator = Simulator::esx(SimulatorConfig::default())?;
//! let host = simulator.layout().unwrap().host.clone();
//!
//! let info = simulator
//!     .enter_maintenance_mode(EnterMaintenanceModeRequest::new(host))
//!     .await?
//!     .wait()
//!     .await?;
//! assert!(info.error().is_none());
//! ```

pub mod requests;

pub use requests::{
    AddStandaloneHostRequest, DestroyHostRequest, EnterMaintenanceModeRequest,
    ExitMaintenanceModeRequest, InstallHostPatchV2Request, ShutdownHostRequest,
};

use async_trait::async_trait;
use tracing::info;

use crate::config::SimulatorConfig;
use crate::domain::ManagedObjectReference;
use crate::errors::SimulatorResult;
use crate::inventory::{
    create_default_esx, create_root_folder, AddStandaloneHostWork, EsxLayout, InstallHostPatchWork,
};
use crate::lifecycle::{EnterMaintenanceModeWork, ExitMaintenanceModeWork, ShutdownHostWork};
use crate::model::TaskInfo;
use crate::registry::{EntityRegistry, SharedRegistry};
use crate::task::{TaskHandle, TaskRunner, TaskWork};
use crate::teardown::DestroyHostWork;

/// Host-facing operations of the simulator
///
/// Faults are reported on the returned task. An `Err` here means the
/// simulator itself failed (for instance `this` does not resolve).
#[async_trait]
pub trait HostSystemService: Send + Sync {
    /// Create a standalone host with its compute resource in a folder
    async fn add_standalone_host(
        &self,
        request: AddStandaloneHostRequest,
    ) -> SimulatorResult<TaskHandle>;

    /// Append software units to a host's patch manager
    async fn install_host_patch_v2(
        &self,
        request: InstallHostPatchV2Request,
    ) -> SimulatorResult<TaskHandle>;

    /// Cascading destroy of a host
    async fn destroy_host(&self, request: DestroyHostRequest) -> SimulatorResult<TaskHandle>;

    async fn enter_maintenance_mode(
        &self,
        request: EnterMaintenanceModeRequest,
    ) -> SimulatorResult<TaskHandle>;

    async fn exit_maintenance_mode(
        &self,
        request: ExitMaintenanceModeRequest,
    ) -> SimulatorResult<TaskHandle>;

    async fn shutdown_host(&self, request: ShutdownHostRequest) -> SimulatorResult<TaskHandle>;

    /// Current info of any task
    async fn task_info(&self, task: &ManagedObjectReference) -> SimulatorResult<TaskInfo>;
}

/// In-process simulator
#[derive(Debug, Clone)]
pub struct Simulator {
    registry: SharedRegistry,
    runner: TaskRunner,
    config: SimulatorConfig,
    root_folder: ManagedObjectReference,
    layout: Option<EsxLayout>,
}

impl Simulator {
    /// Empty inventory with only the root folder
    pub fn new(config: SimulatorConfig) -> SimulatorResult<Self> {
        config.validate()?;

        let mut registry = EntityRegistry::with_event_limit(config.event_history_limit);
        let root_folder = create_root_folder(&mut registry);
        let registry = SharedRegistry::new(registry);
        let runner = TaskRunner::new(registry.clone(), config.task_execution);

        info!(
            execution = %config.task_execution,
            teardown_policy = %config.teardown_failure_policy,
            "Simulator started"
        );
        Ok(Self {
            registry,
            runner,
            config,
            root_folder,
            layout: None,
        })
    }

    /// Inventory of a standalone ESX host named by `default_host_name`
    pub fn esx(config: SimulatorConfig) -> SimulatorResult<Self> {
        let mut simulator = Self::new(config)?;
        let layout = {
            let mut registry = simulator.registry.write();
            create_default_esx(
                &mut registry,
                &simulator.root_folder,
                &simulator.config.default_host_name,
            )?
        };
        simulator.layout = Some(layout);
        Ok(simulator)
    }

    /// Standalone ESX simulator configured from `VSIM_*` variables
    pub fn from_env() -> SimulatorResult<Self> {
        Self::esx(SimulatorConfig::from_env()?)
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn runner(&self) -> &TaskRunner {
        &self.runner
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn root_folder(&self) -> &ManagedObjectReference {
        &self.root_folder
    }

    /// Fixed references of the standalone ESX inventory, if built with [`Simulator::esx`]
    pub fn layout(&self) -> Option<&EsxLayout> {
        self.layout.as_ref()
    }

    /// Submit any collaborator work as a task
    pub fn submit<W: TaskWork>(&self, work: W) -> SimulatorResult<TaskHandle> {
        self.runner.submit(work)
    }
}

#[async_trait]
impl HostSystemService for Simulator {
    async fn add_standalone_host(
        &self,
        request: AddStandaloneHostRequest,
    ) -> SimulatorResult<TaskHandle> {
        self.submit(AddStandaloneHostWork {
            folder: request.this,
            spec: request.spec,
            add_connected: request.add_connected,
        })
    }

    async fn install_host_patch_v2(
        &self,
        request: InstallHostPatchV2Request,
    ) -> SimulatorResult<TaskHandle> {
        self.submit(InstallHostPatchWork {
            patch_manager: request.this,
            spec: request.spec,
        })
    }

    async fn destroy_host(&self, request: DestroyHostRequest) -> SimulatorResult<TaskHandle> {
        self.submit(DestroyHostWork::new(
            request.this,
            self.config.teardown_failure_policy,
        ))
    }

    async fn enter_maintenance_mode(
        &self,
        request: EnterMaintenanceModeRequest,
    ) -> SimulatorResult<TaskHandle> {
        self.submit(EnterMaintenanceModeWork {
            host: request.this,
            timeout: request.timeout,
            evacuate_powered_off_vms: request.evacuate_powered_off_vms,
        })
    }

    async fn exit_maintenance_mode(
        &self,
        request: ExitMaintenanceModeRequest,
    ) -> SimulatorResult<TaskHandle> {
        self.submit(ExitMaintenanceModeWork {
            host: request.this,
            timeout: request.timeout,
        })
    }

    async fn shutdown_host(&self, request: ShutdownHostRequest) -> SimulatorResult<TaskHandle> {
        self.submit(ShutdownHostWork {
            host: request.this,
            force: request.force,
        })
    }

    async fn task_info(&self, task: &ManagedObjectReference) -> SimulatorResult<TaskInfo> {
        self.registry.task_info(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SimulatorError;
    use crate::model::{HostSystem, TaskInfoState};

    #[test]
    fn test_esx_layout_uses_default_host_name() {
        let simulator =
            Simulator::esx(SimulatorConfig::default().with_default_host_name("esx-sim.lab")).unwrap();
        let layout = simulator.layout().unwrap();

        let registry = simulator.registry().read();
        let host = registry.get_as::<HostSystem>(&layout.host).unwrap();
        assert_eq!(host.summary.config.name, "esx-sim.lab");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Simulator::new(SimulatorConfig::default().with_event_history_limit(0)).unwrap_err();
        assert!(matches!(err, SimulatorError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_task_info_by_reference() {
        let simulator = Simulator::esx(SimulatorConfig::default()).unwrap();
        let host = simulator.layout().unwrap().host.clone();

        let handle = simulator
            .shutdown_host(ShutdownHostRequest::new(host))
            .await
            .unwrap();
        let task = handle.reference().clone();
        let waited = handle.wait().await.unwrap();

        let read = simulator.task_info(&task).await.unwrap();
        assert_eq!(read, waited);
        assert_eq!(read.state, TaskInfoState::Success);
    }

    #[tokio::test]
    async fn test_unresolved_target_is_an_error() {
        let simulator = Simulator::new(SimulatorConfig::default()).unwrap();
        let missing = ManagedObjectReference::new(
            crate::domain::ManagedObjectType::HostSystem,
            "host-404",
        );
        let err = simulator
            .destroy_host(DestroyHostRequest { this: missing })
            .await
            .unwrap_err();
        assert!(matches!(err, SimulatorError::UnresolvedReference(_)));
    }
}
