// Copyright (c) 2025 - Cowboy AI, Inc.
//! Host Lifecycle State Machines
//!
//! Two independent two-state machines per host, both Mealy machines whose
//! output is the event the transition emits.
//!
//! # Maintenance Mode
//!
//! ```text
//!        Enter
//!   Off ───────▶ On
//!    ▲           │
//!    └───────────┘
//!        Exit
//! ```
//!
//! # Power State
//!
//! ```text
//!              Shutdown
//!   PoweredOn ──────────▶ PoweredOff
//! ```
//!
//! Any other (state, input) pair is rejected and surfaces to clients as an
//! `InvalidState` fault.

use std::fmt;

use super::{StateMachine, TransitionError, TransitionResult};
use crate::events::EventKind;
use crate::model::HostPowerState;

/// Maintenance flag of a host as a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaintenanceMode {
    Off,
    On,
}

impl MaintenanceMode {
    pub fn is_on(&self) -> bool {
        matches!(self, MaintenanceMode::On)
    }
}

impl From<bool> for MaintenanceMode {
    fn from(in_maintenance_mode: bool) -> Self {
        if in_maintenance_mode {
            MaintenanceMode::On
        } else {
            MaintenanceMode::Off
        }
    }
}

impl fmt::Display for MaintenanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintenanceMode::Off => write!(f, "off"),
            MaintenanceMode::On => write!(f, "on"),
        }
    }
}

/// Maintenance mode command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceInput {
    Enter,
    Exit,
}

impl fmt::Display for MaintenanceInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintenanceInput::Enter => write!(f, "enter"),
            MaintenanceInput::Exit => write!(f, "exit"),
        }
    }
}

impl StateMachine for MaintenanceMode {
    type Input = MaintenanceInput;
    type Output = EventKind;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use MaintenanceInput::*;
        use MaintenanceMode::*;

        match (self, input) {
            (Off, Enter) => Ok((On, EventKind::EnteredMaintenanceMode)),
            (On, Exit) => Ok((Off, EventKind::ExitedMaintenanceMode)),
            (from, input) => Err(TransitionError::InvalidTransition {
                from: from.to_string(),
                input: input.to_string(),
            }),
        }
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        match self {
            MaintenanceMode::Off => vec![MaintenanceInput::Enter],
            MaintenanceMode::On => vec![MaintenanceInput::Exit],
        }
    }
}

/// Power command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerInput {
    Shutdown,
}

impl fmt::Display for PowerInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerInput::Shutdown => write!(f, "shutdown"),
        }
    }
}

impl StateMachine for HostPowerState {
    type Input = PowerInput;
    type Output = EventKind;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        match (self, input) {
            (HostPowerState::PoweredOn, PowerInput::Shutdown) => {
                Ok((HostPowerState::PoweredOff, EventKind::HostShutdown))
            }
            (from, input) => Err(TransitionError::InvalidTransition {
                from: from.to_string(),
                input: input.to_string(),
            }),
        }
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        match self {
            HostPowerState::PoweredOn => vec![PowerInput::Shutdown],
            HostPowerState::PoweredOff => Vec::new(),
        }
    }
}
