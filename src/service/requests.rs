// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Requests
//!
//! One request type per public operation. `this` names the managed object the
//! method is invoked on, as in the SOAP API.

use serde::{Deserialize, Serialize};

use crate::domain::ManagedObjectReference;
use crate::inventory::{HostConnectSpec, HostPatchSpec};

/// `Folder.AddStandaloneHost_Task`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStandaloneHostRequest {
    /// Folder receiving the new compute resource
    pub this: ManagedObjectReference,
    pub spec: HostConnectSpec,
    pub add_connected: bool,
}

/// `HostPatchManager.InstallHostPatchV2_Task`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallHostPatchV2Request {
    /// Patch manager of the host
    pub this: ManagedObjectReference,
    #[serde(flatten)]
    pub spec: HostPatchSpec,
}

/// `HostSystem.Destroy_Task`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyHostRequest {
    pub this: ManagedObjectReference,
}

/// `HostSystem.EnterMaintenanceMode_Task`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterMaintenanceModeRequest {
    pub this: ManagedObjectReference,
    #[serde(default)]
    pub timeout: i32,
    pub evacuate_powered_off_vms: Option<bool>,
}

impl EnterMaintenanceModeRequest {
    pub fn new(this: ManagedObjectReference) -> Self {
        Self {
            this,
            timeout: 0,
            evacuate_powered_off_vms: None,
        }
    }
}

/// `HostSystem.ExitMaintenanceMode_Task`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitMaintenanceModeRequest {
    pub this: ManagedObjectReference,
    #[serde(default)]
    pub timeout: i32,
}

impl ExitMaintenanceModeRequest {
    pub fn new(this: ManagedObjectReference) -> Self {
        Self { this, timeout: 0 }
    }
}

/// `HostSystem.ShutdownHost_Task`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownHostRequest {
    pub this: ManagedObjectReference,
    #[serde(default)]
    pub force: bool,
}

impl ShutdownHostRequest {
    pub fn new(this: ManagedObjectReference) -> Self {
        Self { this, force: false }
    }
}
