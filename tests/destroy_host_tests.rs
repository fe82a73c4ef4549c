// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cascading Host Destroy Tests
//!
//! Each test builds a small inventory around the standalone ESX host, destroys
//! a host through the service surface and checks what is left behind.

mod fixtures;

use pretty_assertions::assert_eq;

use cim_vsphere_sim::domain::{ManagedObjectType, TeardownStep};
use cim_vsphere_sim::inventory::{create_resource_pool, create_virtual_app, create_vm, PoolSpec, VmSpec};
use cim_vsphere_sim::model::{
    Datastore, DistributedVirtualPortgroup, HostNetworkSystem, HostSystem, Task, TaskInfoState, VirtualMachine,
    VmwareDistributedVirtualSwitch,
};
use cim_vsphere_sim::service::DestroyHostRequest;
use cim_vsphere_sim::{
    EventKind, HostSystemService, ManagedObjectReference, MethodFault, Simulator, SimulatorError,
    TaskInfo, TeardownFailurePolicy, TeardownReport,
};

async fn destroy(sim: &Simulator, host: &ManagedObjectReference) -> TaskInfo {
    sim.destroy_host(DestroyHostRequest { this: host.clone() })
        .await
        .unwrap()
        .wait()
        .await
        .unwrap()
}

fn report(info: &TaskInfo) -> TeardownReport {
    serde_json::from_value(info.result().expect("destroy succeeded").clone()).unwrap()
}

#[tokio::test]
async fn test_last_mount_destroys_shared_mount_detaches() {
    let sim = fixtures::esx(TeardownFailurePolicy::Ignore);
    let host = fixtures::default_host(&sim);
    let other = fixtures::add_host(&sim, "esx02.lab");

    let local = fixtures::local_datastore(&sim, &host, "datastore1");
    let shared = fixtures::mount_nas(&sim, &host, "nfs-shared");
    assert_eq!(fixtures::mount_nas(&sim, &other, "nfs-shared"), shared);

    let info = destroy(&sim, &host).await;
    assert_eq!(info.state, TaskInfoState::Success);

    let report = report(&info);
    assert_eq!(report.destroyed_datastores, vec![local.clone()]);
    assert_eq!(report.detached_datastores, vec![shared.clone()]);

    let registry = sim.registry().read();
    assert!(!registry.contains(&host));
    assert!(!registry.contains(&local));

    let shared = registry.get_as::<Datastore>(&shared).unwrap();
    assert_eq!(shared.host_count(), 1);
    assert!(!shared.is_mounted_on(&host));
    assert!(shared.is_mounted_on(&other));
    assert_eq!(
        registry.get_as::<HostSystem>(&other).unwrap().datastore,
        vec![shared.base.self_ref.clone()]
    );
}

#[tokio::test]
async fn test_leaves_distributed_switches_without_touching_other_members() {
    let sim = fixtures::esx(TeardownFailurePolicy::Ignore);
    let host = fixtures::default_host(&sim);
    let other = fixtures::add_host(&sim, "esx02.lab");
    let (dvs, portgroup) = fixtures::dvs_with_members(&sim, "dvs-prod", &[host.clone(), other.clone()]);

    let info = destroy(&sim, &host).await;
    assert_eq!(report(&info).reconfigured_switches, vec![dvs.clone()]);

    let registry = sim.registry().read();
    let switch = registry.get_as::<VmwareDistributedVirtualSwitch>(&dvs).unwrap();
    assert_eq!(switch.members(), vec![&other]);
    assert_eq!(
        registry
            .get_as::<DistributedVirtualPortgroup>(&portgroup)
            .unwrap()
            .host,
        vec![other.clone()]
    );
    assert!(registry
        .get_as::<HostSystem>(&other)
        .unwrap()
        .network
        .contains(&portgroup));

    let left: Vec<_> = registry
        .events()
        .for_host(&host)
        .filter(|e| matches!(e.kind, EventKind::DvsHostLeft { .. }))
        .collect();
    assert_eq!(left.len(), 1);
}

#[tokio::test]
async fn test_dependents_of_every_kind_are_destroyed() {
    let sim = fixtures::esx(TeardownFailurePolicy::Ignore);
    let host = fixtures::default_host(&sim);
    let root = fixtures::root_pool(&sim, &host);

    let (pool, vapp, pooled_vm, app_vm) = {
        let mut registry = sim.registry().write();
        let pool = create_resource_pool(&mut registry, &PoolSpec::new("gold", root.clone()).on_host(host.clone()))
            .unwrap()
            .unwrap();
        let vapp = create_virtual_app(&mut registry, &PoolSpec::new("shop", root.clone()).on_host(host.clone()))
            .unwrap()
            .unwrap();
        let pooled_vm = create_vm(&mut registry, &VmSpec::new("db01", host.clone(), pool.clone()))
            .unwrap()
            .unwrap();
        let app_vm = create_vm(&mut registry, &VmSpec::new("web01", host.clone(), vapp.clone()))
            .unwrap()
            .unwrap();
        (pool, vapp, pooled_vm, app_vm)
    };

    let info = destroy(&sim, &host).await;
    let report = report(&info);
    assert!(report.is_clean());
    assert!(report.destroyed.contains(&pool));
    assert!(report.destroyed.contains(&vapp));
    assert!(report.destroyed.contains(&pooled_vm));
    // destroyed together with its virtual app, not on its own
    assert!(!report.destroyed.contains(&app_vm));

    let registry = sim.registry().read();
    for kind in [
        ManagedObjectType::HostSystem,
        ManagedObjectType::VirtualMachine,
        ManagedObjectType::VirtualApp,
        ManagedObjectType::ResourcePool,
        ManagedObjectType::ComputeResource,
        ManagedObjectType::HostDatastoreSystem,
        ManagedObjectType::HostNetworkSystem,
        ManagedObjectType::HostPatchManager,
    ] {
        assert!(registry.references_of_type(kind).is_empty(), "{kind} left behind");
    }
    assert!(registry.dangling_references().is_empty());
    assert_eq!(registry.events().latest().unwrap().kind, EventKind::HostRemoved);
}

fn host_with_stuck_vm(sim: &Simulator) -> (ManagedObjectReference, ManagedObjectReference, ManagedObjectReference) {
    let host = fixtures::default_host(sim);
    let idle = fixtures::vm_on(sim, &host, "idle01", false);
    let busy = fixtures::vm_on(sim, &host, "busy01", true);
    (host, idle, busy)
}

#[tokio::test]
async fn test_ignore_policy_releases_host() {
    let sim = fixtures::esx(TeardownFailurePolicy::Ignore);
    let (host, idle, busy) = host_with_stuck_vm(&sim);

    let info = destroy(&sim, &host).await;
    assert_eq!(info.state, TaskInfoState::Success);

    let report = report(&info);
    assert_eq!(report.destroyed, vec![idle]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].entity, busy);

    let registry = sim.registry().read();
    assert!(!registry.contains(&host));
    let survivor = registry.get_as::<VirtualMachine>(&busy).unwrap();
    assert_eq!(survivor.runtime.host, None);
    assert!(registry.dangling_references().is_empty());
}

#[tokio::test]
async fn test_abort_policy_keeps_host() {
    let sim = fixtures::esx(TeardownFailurePolicy::Abort);
    let (host, idle, _busy) = host_with_stuck_vm(&sim);

    let info = destroy(&sim, &host).await;
    assert!(matches!(
        info.error(),
        Some(MethodFault::InvalidPowerState { .. })
    ));

    let network_system = fixtures::config_manager(&sim, &host).network_system.unwrap();

    let registry = sim.registry().read();
    assert!(registry.contains(&host));
    assert!(!registry.contains(&idle));
    // later steps never ran
    assert!(registry
        .get_as::<HostNetworkSystem>(&network_system)
        .unwrap()
        .network_info
        .find_vswitch("vSwitch0")
        .is_some());
    assert!(registry
        .events()
        .iter()
        .all(|e| e.kind != EventKind::HostRemoved));
}

#[tokio::test]
async fn test_report_partial_policy_faults_after_release() {
    let sim = fixtures::esx(TeardownFailurePolicy::ReportPartial);
    let (host, _idle, busy) = host_with_stuck_vm(&sim);

    let info = destroy(&sim, &host).await;
    let Some(MethodFault::PartialTeardown { failures }) = info.error() else {
        panic!("expected PartialTeardown, got {:?}", info.outcome);
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].step, TeardownStep::Dependents);
    assert_eq!(failures[0].entity, busy);

    assert!(!sim.registry().read().contains(&host));
}

#[tokio::test]
async fn test_clean_destroy_succeeds_under_every_policy() {
    for policy in [
        TeardownFailurePolicy::Ignore,
        TeardownFailurePolicy::Abort,
        TeardownFailurePolicy::ReportPartial,
    ] {
        let sim = fixtures::esx(policy);
        let host = fixtures::default_host(&sim);
        let info = destroy(&sim, &host).await;
        assert_eq!(info.state, TaskInfoState::Success, "{policy}");
        assert_eq!(report(&info).removed_switches, vec!["vSwitch0"]);
    }
}

#[tokio::test]
async fn test_unresolved_dependent_is_fatal() {
    let sim = fixtures::esx(TeardownFailurePolicy::Ignore);
    let host = fixtures::default_host(&sim);
    let ghost = ManagedObjectReference::new(ManagedObjectType::VirtualMachine, "vm-404");
    sim.registry()
        .write()
        .get_as_mut::<HostSystem>(&host)
        .unwrap()
        .vm
        .push(ghost.clone());

    let err = sim
        .destroy_host(DestroyHostRequest { this: host.clone() })
        .await
        .unwrap_err();
    assert_eq!(err, SimulatorError::UnresolvedReference(ghost));

    let registry = sim.registry().read();
    assert!(registry.contains(&host));

    let task = registry
        .references_of_type(ManagedObjectType::Task)
        .into_iter()
        .filter_map(|t| registry.get_as::<Task>(&t).ok().map(|t| t.info.clone()))
        .find(|info| info.description_id == "HostSystem.destroy")
        .unwrap();
    assert!(matches!(task.error(), Some(MethodFault::SystemError { .. })));
}

#[tokio::test]
async fn test_unresolved_datastore_leaves_host_untouched() {
    let sim = fixtures::esx(TeardownFailurePolicy::Ignore);
    let host = fixtures::default_host(&sim);
    let vm = fixtures::vm_on(&sim, &host, "idle01", false);
    let network_system = fixtures::config_manager(&sim, &host).network_system.unwrap();
    let missing = ManagedObjectReference::new(ManagedObjectType::Datastore, "datastore-404");
    sim.registry()
        .write()
        .get_as_mut::<HostSystem>(&host)
        .unwrap()
        .datastore
        .push(missing.clone());

    let err = sim
        .destroy_host(DestroyHostRequest { this: host.clone() })
        .await
        .unwrap_err();
    assert_eq!(err, SimulatorError::UnresolvedReference(missing));

    let registry = sim.registry().read();
    assert!(registry.contains(&host));
    assert!(registry.contains(&vm));
    assert!(registry
        .get_as::<HostNetworkSystem>(&network_system)
        .unwrap()
        .network_info
        .find_vswitch("vSwitch0")
        .is_some());
}
