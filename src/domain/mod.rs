// Copyright (c) 2025 - Cowboy AI, Inc.
//! Simulator Domain Vocabulary
//!
//! Value objects shared by every layer of the simulator:
//!
//! - [`ManagedObjectReference`] - stable `(type, value)` identity of an entity
//! - [`ManagedObjectType`] - closed taxonomy of simulated object types
//! - [`MethodFault`] - client-visible fault values carried by tasks
//! - [`HostName`] - DNS name or IP literal of an ESX host
//! - [`VlanId`], [`Mtu`], [`PortCount`] - host networking value objects

pub mod fault;
pub mod hostname;
pub mod network;
pub mod object_type;
pub mod reference;

pub use fault::{MethodFault, TeardownFailure, TeardownStep};
pub use hostname::{HostName, HostNameError};
pub use network::{Mtu, NetworkError, PortCount, VlanId};
pub use object_type::{ManagedObjectType, ObjectCategory};
pub use reference::ManagedObjectReference;
