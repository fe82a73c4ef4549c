// Copyright (c) 2025 - Cowboy AI, Inc.
//! Host Patch Manager

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ManagedObjectReference;
use crate::errors::SimulatorResult;
use crate::events::EventKind;
use crate::model::HostPatchManager;
use crate::registry::EntityRegistry;
use crate::task::{no_result, TaskWork, WorkOutcome};

/// `InstallHostPatchV2_Task` arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostPatchSpec {
    #[serde(default)]
    pub vib_urls: Vec<String>,
    #[serde(default)]
    pub bundle_urls: Vec<String>,
    #[serde(default)]
    pub meta_urls: Vec<String>,
}

impl HostPatchSpec {
    pub fn vibs<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vib_urls: urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Every URL, in vib, bundle, meta order
    pub fn urls(&self) -> impl Iterator<Item = &String> {
        self.vib_urls
            .iter()
            .chain(self.bundle_urls.iter())
            .chain(self.meta_urls.iter())
    }
}

/// `HostPatchManager.InstallHostPatchV2_Task`
#[derive(Debug, Clone)]
pub struct InstallHostPatchWork {
    pub patch_manager: ManagedObjectReference,
    pub spec: HostPatchSpec,
}

impl TaskWork for InstallHostPatchWork {
    fn target(&self) -> &ManagedObjectReference {
        &self.patch_manager
    }

    fn description_id(&self) -> &'static str {
        "HostPatchManager.installHostPatchV2"
    }

    fn run(
        &mut self,
        registry: &mut EntityRegistry,
        task: &ManagedObjectReference,
    ) -> SimulatorResult<WorkOutcome> {
        let vibs: Vec<String> = self.spec.urls().cloned().collect();

        let manager = registry.get_as_mut::<HostPatchManager>(&self.patch_manager)?;
        manager.install(vibs.iter().cloned());
        let host = manager.host.clone();
        let installed = manager.vibs.len();

        info!(
            patch_manager = %self.patch_manager,
            host = %host,
            added = vibs.len(),
            installed,
            "Host patch installed"
        );
        registry.record_event(&host, Some(task), EventKind::PatchInstalled { vibs });
        no_result()
    }
}

/// Installed units of a patch manager, oldest first
pub fn installed_vibs(
    registry: &EntityRegistry,
    patch_manager: &ManagedObjectReference,
) -> SimulatorResult<Vec<String>> {
    Ok(registry
        .get_as::<HostPatchManager>(patch_manager)?
        .vibs
        .clone())
}
