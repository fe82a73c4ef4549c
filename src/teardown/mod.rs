// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cascading Host Destroy
//!
//! Destroying a host tears down everything hanging off it, in a fixed order,
//! before the host itself is released:
//!
//! ```text
//! 1. dependents             host.vm          → VM / vApp / pool destroy tasks
//! 2. virtual switches       network system   → remove_virtual_switch(name)
//! 3. datastores             host.datastore   → destroy (last mount) or remove
//! 4. distributed switches   host.network     → reconfigure(remove host), once per DVS
//! 5. release                sub-managers, compute resource, host, links
//! ```
//!
//! Each step iterates over a snapshot of the list it walks, because the
//! calls it makes mutate that list. Every step and the release run in the
//! same `run` call, so with the registry's write lock held no reader sees a
//! partially destroyed host.
//!
//! # Failure Policy
//!
//! Faults from dependent calls are handled by [`TeardownFailurePolicy`].
//! Internal errors (a reference that does not resolve) are never subject to
//! the policy: they abort the task with `SystemError`. Every link the steps
//! follow is resolved before the first step runs, so such an abort leaves the
//! host untouched. A host that is already gone is a `NotFound` fault.

mod report;

pub use report::TeardownReport;

use std::ops::ControlFlow;

use tracing::{debug, info, warn};

use crate::config::TeardownFailurePolicy;
use crate::domain::{
    ManagedObjectReference, ManagedObjectType, MethodFault, TeardownFailure, TeardownStep,
};
use crate::errors::SimulatorResult;
use crate::events::EventKind;
use crate::inventory::{
    destroy_datastore, remove_datastore, remove_virtual_switch, DestroyResourcePoolWork,
    DestroyVirtualAppWork, DestroyVmWork, DvsConfigSpec, ReconfigureDvsWork,
};
use crate::model::{
    ComputeResource, Datastore, DistributedVirtualPortgroup, Entity, HostDatastoreSystem,
    HostNetworkSystem, HostSystem, ResourcePool, VmwareDistributedVirtualSwitch,
};
use crate::registry::EntityRegistry;
use crate::task::{run_nested, TaskWork, WorkOutcome};

/// `HostSystem.Destroy_Task`
#[derive(Debug, Clone)]
pub struct DestroyHostWork {
    pub host: ManagedObjectReference,
    pub policy: TeardownFailurePolicy,
}

impl DestroyHostWork {
    pub fn new(host: ManagedObjectReference, policy: TeardownFailurePolicy) -> Self {
        Self { host, policy }
    }
}

impl TaskWork for DestroyHostWork {
    fn target(&self) -> &ManagedObjectReference {
        &self.host
    }

    fn description_id(&self) -> &'static str {
        "HostSystem.destroy"
    }

    fn run(
        &mut self,
        registry: &mut EntityRegistry,
        task: &ManagedObjectReference,
    ) -> SimulatorResult<WorkOutcome> {
        // an earlier destroy may have released the host after this task was queued
        if registry.find(&self.host).is_none() {
            info!(host = %self.host, "Host already gone, nothing to destroy");
            return Ok(Err(MethodFault::not_found(&self.host)));
        }

        let mut teardown = Teardown {
            registry,
            host: self.host.clone(),
            task: task.clone(),
            policy: self.policy,
            report: TeardownReport::default(),
        };

        teardown.resolve_links()?;

        for step in STEPS {
            if let ControlFlow::Break(fault) = teardown.run_step(step)? {
                warn!(host = %self.host, step = %step, "Host destroy aborted, host stays registered");
                return Ok(Err(fault));
            }
        }

        release_host(teardown.registry, &self.host, task)?;
        let report = teardown.report;

        info!(
            host = %self.host,
            policy = %self.policy,
            destroyed = report.destroyed.len(),
            failures = report.failures.len(),
            "Host destroyed"
        );

        match self.policy {
            TeardownFailurePolicy::ReportPartial if !report.is_clean() => {
                Ok(Err(MethodFault::PartialTeardown {
                    failures: report.failures,
                }))
            }
            _ => Ok(Ok(serde_json::to_value(&report)?)),
        }
    }
}

const STEPS: [TeardownStep; 4] = [
    TeardownStep::Dependents,
    TeardownStep::VirtualSwitches,
    TeardownStep::Datastores,
    TeardownStep::DistributedSwitches,
];

struct Teardown<'a> {
    registry: &'a mut EntityRegistry,
    host: ManagedObjectReference,
    task: ManagedObjectReference,
    policy: TeardownFailurePolicy,
    report: TeardownReport,
}

impl Teardown<'_> {
    fn run_step(&mut self, step: TeardownStep) -> SimulatorResult<ControlFlow<MethodFault>> {
        debug!(host = %self.host, step = %step, "Teardown step");
        match step {
            TeardownStep::Dependents => self.destroy_dependents(),
            TeardownStep::VirtualSwitches => self.remove_virtual_switches(),
            TeardownStep::Datastores => self.release_datastores(),
            TeardownStep::DistributedSwitches => self.leave_distributed_switches(),
        }
    }

    fn host(&self) -> SimulatorResult<&HostSystem> {
        self.registry.get_as::<HostSystem>(&self.host)
    }

    /// Resolve every link the steps will follow, before any of them runs
    fn resolve_links(&self) -> SimulatorResult<()> {
        let host = self.host()?;
        let registry = &*self.registry;

        for dependent in &host.vm {
            registry.get(dependent)?;
        }
        if let Some(network_system) = &host.config_manager.network_system {
            registry.get_as::<HostNetworkSystem>(network_system)?;
        }
        if let Some(datastore_system) = &host.config_manager.datastore_system {
            registry.get_as::<HostDatastoreSystem>(datastore_system)?;
        }
        for datastore in &host.datastore {
            registry.get_as::<Datastore>(datastore)?;
        }
        for network in host
            .network
            .iter()
            .filter(|n| n.kind == ManagedObjectType::DistributedVirtualPortgroup)
        {
            let portgroup = registry.get_as::<DistributedVirtualPortgroup>(network)?;
            if let Some(dvs) = &portgroup.distributed_virtual_switch {
                registry.get_as::<VmwareDistributedVirtualSwitch>(dvs)?;
            }
        }
        Ok(())
    }

    fn fail(
        &mut self,
        step: TeardownStep,
        entity: &ManagedObjectReference,
        subject: String,
        fault: MethodFault,
    ) -> ControlFlow<MethodFault> {
        warn!(
            host = %self.host,
            step = %step,
            entity = %entity,
            subject = %subject,
            fault = fault.name(),
            "Dependent teardown failed: {}",
            fault
        );
        if self.policy == TeardownFailurePolicy::Abort {
            return ControlFlow::Break(fault);
        }
        self.report.failures.push(TeardownFailure {
            step,
            entity: entity.clone(),
            subject,
            fault: Box::new(fault),
        });
        ControlFlow::Continue(())
    }

    fn destroy_dependents(&mut self) -> SimulatorResult<ControlFlow<MethodFault>> {
        let snapshot = self.host()?.vm.clone();
        for dependent in &snapshot {
            // members of an already destroyed virtual app
            let Some(entity) = self.registry.find(dependent) else {
                continue;
            };
            let name = entity.name().to_string();

            let info = match entity.kind() {
                ManagedObjectType::VirtualMachine => run_nested(
                    self.registry,
                    DestroyVmWork {
                        vm: dependent.clone(),
                    },
                )?,
                ManagedObjectType::VirtualApp => run_nested(
                    self.registry,
                    DestroyVirtualAppWork {
                        vapp: dependent.clone(),
                    },
                )?,
                ManagedObjectType::ResourcePool => run_nested(
                    self.registry,
                    DestroyResourcePoolWork {
                        pool: dependent.clone(),
                    },
                )?,
                other => {
                    debug!(host = %self.host, dependent = %dependent, kind = %other, "Skipping dependent");
                    continue;
                }
            };

            match info.error() {
                Some(fault) => {
                    let fault = fault.clone();
                    if let ControlFlow::Break(fault) =
                        self.fail(TeardownStep::Dependents, dependent, name, fault)
                    {
                        return Ok(ControlFlow::Break(fault));
                    }
                }
                None => self.report.destroyed.push(dependent.clone()),
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn remove_virtual_switches(&mut self) -> SimulatorResult<ControlFlow<MethodFault>> {
        let Some(network_system) = self.host()?.config_manager.network_system.clone() else {
            return Ok(ControlFlow::Continue(()));
        };
        let names = self
            .registry
            .get_as::<HostNetworkSystem>(&network_system)?
            .network_info
            .vswitch_names();

        for name in names {
            match remove_virtual_switch(self.registry, &network_system, &name)? {
                Ok(()) => self.report.removed_switches.push(name),
                Err(fault) => {
                    if let ControlFlow::Break(fault) =
                        self.fail(TeardownStep::VirtualSwitches, &network_system, name, fault)
                    {
                        return Ok(ControlFlow::Break(fault));
                    }
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn release_datastores(&mut self) -> SimulatorResult<ControlFlow<MethodFault>> {
        let host = self.host()?;
        let Some(datastore_system) = host.config_manager.datastore_system.clone() else {
            return Ok(ControlFlow::Continue(()));
        };
        let snapshot = host.datastore.clone();

        for datastore in &snapshot {
            let record = self.registry.get_as::<Datastore>(datastore)?;
            let name = record.name().to_string();
            let last_mount = record.host_count() == 1;

            let task = self.task.clone();
            let outcome = if last_mount {
                destroy_datastore(self.registry, &datastore_system, datastore, Some(&task))?
            } else {
                remove_datastore(self.registry, &datastore_system, datastore, Some(&task))?
            };

            match outcome {
                Ok(()) if last_mount => self.report.destroyed_datastores.push(datastore.clone()),
                Ok(()) => self.report.detached_datastores.push(datastore.clone()),
                Err(fault) => {
                    if let ControlFlow::Break(fault) =
                        self.fail(TeardownStep::Datastores, datastore, name, fault)
                    {
                        return Ok(ControlFlow::Break(fault));
                    }
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn leave_distributed_switches(&mut self) -> SimulatorResult<ControlFlow<MethodFault>> {
        let snapshot = self.host()?.network.clone();

        let mut switches: Vec<ManagedObjectReference> = Vec::new();
        for network in snapshot
            .iter()
            .filter(|n| n.kind == ManagedObjectType::DistributedVirtualPortgroup)
        {
            let portgroup = self.registry.get_as::<DistributedVirtualPortgroup>(network)?;
            if let Some(dvs) = &portgroup.distributed_virtual_switch {
                if !switches.contains(dvs) {
                    switches.push(dvs.clone());
                }
            }
        }

        for dvs in switches {
            let name = self.registry.get(&dvs)?.name().to_string();
            let info = run_nested(
                self.registry,
                ReconfigureDvsWork {
                    dvs: dvs.clone(),
                    spec: DvsConfigSpec::remove_host(self.host.clone()),
                },
            )?;
            match info.error() {
                Some(fault) => {
                    let fault = fault.clone();
                    if let ControlFlow::Break(fault) =
                        self.fail(TeardownStep::DistributedSwitches, &dvs, name, fault)
                    {
                        return Ok(ControlFlow::Break(fault));
                    }
                }
                None => self.report.reconfigured_switches.push(dvs),
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// Remove a host, its sub-managers and every link to them
///
/// A compute resource left without hosts goes too, with its root pool and
/// everything below it.
pub fn release_host(
    registry: &mut EntityRegistry,
    host: &ManagedObjectReference,
    task: &ManagedObjectReference,
) -> SimulatorResult<()> {
    let record = registry.get_as::<HostSystem>(host)?;
    let sub_managers: Vec<ManagedObjectReference> = record
        .config_manager
        .references()
        .into_iter()
        .cloned()
        .collect();
    let parent = record.base.parent.clone();
    let name = record.name().to_string();

    for sub in &sub_managers {
        registry.remove(sub);
        registry.detach_references(sub);
    }

    if let Some(cr) = parent.filter(|p| p.kind == ManagedObjectType::ComputeResource) {
        let compute = registry.get_as_mut::<ComputeResource>(&cr)?;
        compute.host.retain(|h| h != host);
        if compute.host.is_empty() {
            let root_pool = compute.resource_pool.clone();
            if let Some(pool) = root_pool {
                remove_pool_tree(registry, &pool);
            }
            registry.remove(&cr);
            registry.detach_references(&cr);
            debug!(compute_resource = %cr, "Empty compute resource removed");
        }
    }

    registry.remove(host);
    registry.detach_references(host);
    registry.record_event(host, Some(task), EventKind::HostRemoved);

    info!(host = %host, name = %name, "Host released");
    Ok(())
}

fn remove_pool_tree(registry: &mut EntityRegistry, root: &ManagedObjectReference) {
    let mut pending = vec![root.clone()];
    let mut removed = Vec::new();

    while let Some(pool) = pending.pop() {
        let Some(entity) = registry.remove(&pool) else {
            continue;
        };
        if let Some(record) = entity.downcast_ref::<ResourcePool>() {
            pending.extend(record.resource_pool.iter().cloned());
        }
        removed.push(pool);
    }
    for pool in &removed {
        registry.detach_references(pool);
    }
}
