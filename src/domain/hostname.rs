// Copyright (c) 2025 - Cowboy AI, Inc.
//! Host Name Value Object
//!
//! The name a client passes in a `HostConnectSpec`. Real hosts are added by
//! DNS name or by IP literal, so both forms are accepted. Labels may contain
//! underscores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use thiserror::Error;

use super::MethodFault;

/// Host name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostNameError {
    #[error("Host name is empty")]
    Empty,

    #[error("Host name exceeds maximum length of 253 characters: {0}")]
    TooLong(usize),

    #[error("Label exceeds maximum length of 63 characters: {0}")]
    LabelTooLong(String),

    #[error("Empty label in host name: {0}")]
    EmptyLabel(String),

    #[error("Invalid character in host name: {0}")]
    InvalidCharacter(char),

    #[error("Label cannot start or end with hyphen: {0}")]
    InvalidLabelFormat(String),
}

impl HostNameError {
    /// Fault a client receives for this validation failure
    pub fn to_fault(&self, requested: &str) -> MethodFault {
        match self {
            HostNameError::Empty => MethodFault::NoHost { name: None },
            _ => {
                tracing::debug!(host_name = %requested, error = %self, "rejected host name");
                MethodFault::invalid_argument("hostName")
            }
        }
    }
}

/// Name of an ESX host (DNS name or IP literal)
///
/// # Examples
///
/// ```rust
/// use cim_vsphere_sim::domain::HostName;
///
/// assert!(HostName::new("esx01.lab.local").is_ok());
/// assert!(HostName::new("10.0.0.15").is_ok());
/// assert!(HostName::new("").is_err());
/// assert!(HostName::new("-bad").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostName(String);

impl HostName {
    /// Maximum total length for a DNS name
    pub const MAX_LENGTH: usize = 253;

    /// Maximum length for a single DNS label
    pub const MAX_LABEL_LENGTH: usize = 63;

    /// Create a new host name with validation
    pub fn new(name: impl Into<String>) -> Result<Self, HostNameError> {
        let name = name.into();

        if name.is_empty() {
            return Err(HostNameError::Empty);
        }

        if name.parse::<IpAddr>().is_ok() {
            return Ok(Self(name));
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(HostNameError::TooLong(name.len()));
        }

        for label in name.split('.') {
            Self::validate_label(&name, label)?;
        }

        Ok(Self(name))
    }

    fn validate_label(name: &str, label: &str) -> Result<(), HostNameError> {
        if label.is_empty() {
            return Err(HostNameError::EmptyLabel(name.to_string()));
        }

        if label.len() > Self::MAX_LABEL_LENGTH {
            return Err(HostNameError::LabelTooLong(label.to_string()));
        }

        if let Some(ch) = label
            .chars()
            .find(|ch| !ch.is_ascii_alphanumeric() && !matches!(*ch, '-' | '_'))
        {
            return Err(HostNameError::InvalidCharacter(ch));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(HostNameError::InvalidLabelFormat(label.to_string()));
        }

        Ok(())
    }

    /// Get the host name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is an IP literal
    pub fn is_ip_address(&self) -> bool {
        self.0.parse::<IpAddr>().is_ok()
    }

    /// Short name (first label); IP literals are returned whole
    pub fn short_name(&self) -> &str {
        if self.is_ip_address() {
            return &self.0;
        }
        self.0.split('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for HostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HostName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for HostName {
    type Error = HostNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
