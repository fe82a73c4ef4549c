// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects for Host Virtual Switches

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::MethodFault;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid VLAN ID: {0} (must be 0-4095)")]
    InvalidVlanId(u16),

    #[error("Invalid MTU: {0} (must be 1280-9000)")]
    InvalidMtu(u32),

    #[error("Invalid port count: {0} (must be 1-4088)")]
    InvalidPortCount(u32),

    #[error("Switch or portgroup name is empty")]
    EmptyName,
}

impl NetworkError {
    /// Fault a client receives for this validation failure
    pub fn to_fault(&self) -> MethodFault {
        let property = match self {
            NetworkError::InvalidVlanId(_) => "vlanId",
            NetworkError::InvalidMtu(_) => "mtu",
            NetworkError::InvalidPortCount(_) => "numPorts",
            NetworkError::EmptyName => "name",
        };
        MethodFault::invalid_argument(property)
    }
}

/// Portgroup VLAN ID
///
/// 0 means untagged, 4095 trunks all VLANs to the guest (VGT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VlanId(u16);

impl VlanId {
    /// Untagged traffic
    pub const NONE: VlanId = VlanId(0);

    /// Virtual guest tagging
    pub const TRUNK: VlanId = VlanId(4095);

    pub fn new(id: u16) -> Result<Self, NetworkError> {
        if id > 4095 {
            return Err(NetworkError::InvalidVlanId(id));
        }
        Ok(Self(id))
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn is_tagged(&self) -> bool {
        self.0 != 0 && self.0 != 4095
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = NetworkError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Virtual switch MTU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mtu(u32);

impl Mtu {
    pub const MIN: u32 = 1280;
    pub const MAX: u32 = 9000;

    pub fn new(size: u32) -> Result<Self, NetworkError> {
        if !(Self::MIN..=Self::MAX).contains(&size) {
            return Err(NetworkError::InvalidMtu(size));
        }
        Ok(Self(size))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_jumbo(&self) -> bool {
        self.0 > 1500
    }
}

impl Default for Mtu {
    fn default() -> Self {
        Self(1500)
    }
}

impl fmt::Display for Mtu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of ports on a standard virtual switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortCount(u32);

impl PortCount {
    pub const MAX: u32 = 4088;

    pub fn new(ports: u32) -> Result<Self, NetworkError> {
        if ports == 0 || ports > Self::MAX {
            return Err(NetworkError::InvalidPortCount(ports));
        }
        Ok(Self(ports))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for PortCount {
    fn default() -> Self {
        Self(128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlan_id() {
        assert!(VlanId::new(100).unwrap().is_tagged());
        assert!(!VlanId::NONE.is_tagged());
        assert!(!VlanId::TRUNK.is_tagged());
        assert!(VlanId::new(4096).is_err());
    }

    #[test]
    fn test_mtu() {
        assert_eq!(Mtu::default().value(), 1500);
        assert!(Mtu::new(9000).unwrap().is_jumbo());
        assert!(Mtu::new(1279).is_err());
        assert!(Mtu::new(9001).is_err());
    }

    #[test]
    fn test_port_count() {
        assert_eq!(PortCount::default().value(), 128);
        assert!(PortCount::new(0).is_err());
        assert!(PortCount::new(4089).is_err());
    }

    #[test]
    fn test_fault_properties() {
        assert_eq!(
            NetworkError::InvalidMtu(1).to_fault(),
            MethodFault::invalid_argument("mtu")
        );
    }
}
