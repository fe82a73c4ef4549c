// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Host Operations
//!
//! Random operation sequences are applied to a fresh standalone host and the
//! resulting inventory is compared against a trivial model of what should
//! have happened.

use std::collections::BTreeSet;

use cim_vsphere_sim::inventory::{
    create_root_folder, create_standalone_host, installed_vibs, HostConnectSpec, HostPatchSpec,
    InstallHostPatchWork,
};
use cim_vsphere_sim::lifecycle::{EnterMaintenanceModeWork, ExitMaintenanceModeWork};
use cim_vsphere_sim::model::{Entity, HostSystem, TaskInfoState};
use cim_vsphere_sim::task::run_nested;
use cim_vsphere_sim::{EntityRegistry, EventKind, ManagedObjectReference, MethodFault};
use proptest::prelude::*;

// ============================================================================
// Fixtures and Strategies
// ============================================================================

fn standalone() -> (EntityRegistry, ManagedObjectReference) {
    let mut registry = EntityRegistry::new();
    let root = create_root_folder(&mut registry);
    let host = create_standalone_host(&mut registry, &root, &HostConnectSpec::new("esx01.lab"))
        .unwrap()
        .unwrap();
    (registry, host)
}

#[derive(Debug, Clone, Copy)]
enum Toggle {
    Enter,
    Exit,
}

fn toggle_sequence() -> impl Strategy<Value = Vec<Toggle>> {
    prop::collection::vec(prop_oneof![Just(Toggle::Enter), Just(Toggle::Exit)], 0..30)
}

fn vib_url() -> impl Strategy<Value = String> {
    "[a-z]{1,8}-[0-9]\\.[0-9]\\.vib".prop_map(|name| format!("https://depot.lab/{name}"))
}

fn patch_batches() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(vib_url(), 0..5), 0..8)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: maintenance transitions succeed exactly when they change state
    ///
    /// The flag after any sequence equals the last successful transition, and
    /// every rejected request leaves it untouched.
    #[test]
    fn prop_maintenance_follows_guarded_model(toggles in toggle_sequence()) {
        let (mut registry, host) = standalone();
        let mut expected = false;
        let mut transitions = 0usize;

        for toggle in toggles {
            let info = match toggle {
                Toggle::Enter => run_nested(&mut registry, EnterMaintenanceModeWork::new(host.clone())),
                Toggle::Exit => run_nested(&mut registry, ExitMaintenanceModeWork::new(host.clone())),
            }
            .unwrap();

            let allowed = matches!((toggle, expected), (Toggle::Enter, false) | (Toggle::Exit, true));
            if allowed {
                prop_assert_eq!(info.state, TaskInfoState::Success);
                expected = !expected;
                transitions += 1;
            } else {
                prop_assert_eq!(info.error(), Some(&MethodFault::InvalidState));
            }

            let actual = registry.get_as::<HostSystem>(&host).unwrap().runtime.in_maintenance_mode;
            prop_assert_eq!(actual, expected);
        }

        let recorded = registry
            .events()
            .for_host(&host)
            .filter(|e| matches!(
                e.kind,
                EventKind::EnteredMaintenanceMode | EventKind::ExitedMaintenanceMode
            ))
            .count();
        prop_assert_eq!(recorded, transitions);
    }

    /// Property: installed units accumulate in request order
    ///
    /// After any number of installs the patch manager lists exactly the
    /// concatenation of every request, duplicates included.
    #[test]
    fn prop_patch_installs_accumulate(batches in patch_batches()) {
        let (mut registry, host) = standalone();
        let patch_manager = registry
            .get_as::<HostSystem>(&host)
            .unwrap()
            .config_manager
            .patch_manager
            .clone()
            .unwrap();

        for batch in &batches {
            let info = run_nested(
                &mut registry,
                InstallHostPatchWork {
                    patch_manager: patch_manager.clone(),
                    spec: HostPatchSpec::vibs(batch.iter().cloned()),
                },
            )
            .unwrap();
            prop_assert_eq!(info.state, TaskInfoState::Success);
        }

        let expected: Vec<String> = batches.concat();
        prop_assert_eq!(installed_vibs(&registry, &patch_manager).unwrap(), expected);
    }

    /// Property: created references are unique and resolve to themselves
    #[test]
    fn prop_created_references_resolve(names in prop::collection::btree_set("[a-z]{3,10}", 1..12)) {
        let mut registry = EntityRegistry::new();
        let root = create_root_folder(&mut registry);

        let mut created = BTreeSet::new();
        for name in &names {
            let host = create_standalone_host(
                &mut registry,
                &root,
                &HostConnectSpec::new(format!("{name}.lab")),
            )
            .unwrap()
            .unwrap();
            prop_assert!(created.insert(host.clone()), "reference reused: {}", host);
        }

        for host in &created {
            let entity = registry.get(host).unwrap();
            prop_assert_eq!(entity.reference(), host);
            prop_assert_eq!(entity.kind(), host.kind());
        }
        prop_assert!(registry.dangling_references().is_empty());
    }
}
