// Copyright (c) 2025 - Cowboy AI, Inc.
//! Finite State Machine Abstractions
//!
//! Generic state machine types for modeling entity lifecycles. Transitions
//! are pure: they compute the next state and an output without touching the
//! registry. The caller applies the new state as the atomic effect of a task.
//!
//! # State Machine Type
//!
//! Machines here are **Mealy machines**: the output depends on both the
//! current state and the input.
//!
//! ```text
//! (State, Input) → (State, Output)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cim_vsphere_sim::state_machine::*;
//!
//! let (next, event) = MaintenanceMode::Off.transition(&MaintenanceInput::Enter)?;
//! assert_eq!(next, MaintenanceMode::On);
//! ```

pub mod host_lifecycle;

pub use host_lifecycle::{MaintenanceInput, MaintenanceMode, PowerInput};

use crate::domain::MethodFault;

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition from current state with this input is not allowed
    #[error("Invalid transition from {from} on {input}")]
    InvalidTransition { from: String, input: String },
}

impl From<TransitionError> for MethodFault {
    fn from(_: TransitionError) -> Self {
        MethodFault::InvalidState
    }
}

/// Trait for finite state machines
///
/// Implement this trait to define a state machine with typed states,
/// inputs, and outputs.
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Output type produced by transitions (use () if none)
    type Output;

    /// Attempt to transition to a new state given an input
    ///
    /// # Returns
    /// - Ok((new_state, output)) if transition is valid
    /// - Err(TransitionError) if transition is invalid
    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    /// Check if a transition is valid without performing it
    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }

    /// Get all valid inputs from current state (if enumerable)
    fn valid_inputs(&self) -> Vec<Self::Input>
    where
        Self::Input: Clone,
    {
        Vec::new()
    }
}
