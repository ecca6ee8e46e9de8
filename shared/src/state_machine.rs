//! Drone Lifecycle State Machine
//!
//! Defines the legal lifecycle transitions of a load attempt. The machine
//! only decides; persisting each resulting state is the caller's job.

use crate::{loading, DroneState};

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A load attempt begins
    LoadStarted,
    /// Load quantities were committed
    LoadCommitted,
    /// The load attempt failed after it began
    LoadAborted,
}

/// Result of a state transition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition was valid and state changed
    Success(DroneState),
    /// Transition was invalid from current state
    Invalid {
        from: DroneState,
        event: LifecycleEvent,
    },
}

/// Tracks one drone through a load attempt
#[derive(Debug, Clone)]
pub struct LifecycleStateMachine {
    current_state: DroneState,
    /// State held immediately before the current load attempt
    resume_state: Option<DroneState>,
}

impl LifecycleStateMachine {
    /// Start tracking a drone from its persisted state
    pub fn new(initial: DroneState) -> Self {
        Self {
            current_state: initial,
            resume_state: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> DroneState {
        self.current_state
    }

    /// State a rollback would restore, if a load attempt is in progress
    pub fn resume_state(&self) -> Option<DroneState> {
        self.resume_state
    }

    /// Process an event and return the transition result
    pub fn process_event(&mut self, event: LifecycleEvent) -> TransitionResult {
        match self.next_state(event) {
            Some(state) => {
                if event == LifecycleEvent::LoadStarted {
                    self.resume_state = Some(self.current_state);
                } else {
                    self.resume_state = None;
                }
                self.current_state = state;
                TransitionResult::Success(state)
            }
            None => TransitionResult::Invalid {
                from: self.current_state,
                event,
            },
        }
    }

    /// Get the next state for a given event, if the transition is valid
    fn next_state(&self, event: LifecycleEvent) -> Option<DroneState> {
        use DroneState::*;
        use LifecycleEvent::*;

        match (self.current_state, event) {
            (state, LoadStarted) if loading::is_loadable(state) => Some(Loading),
            (Loading, LoadCommitted) => Some(Loaded),
            (Loading, LoadAborted) => self.resume_state,
            _ => None,
        }
    }
}

/// Check if a transition from one state to another is legal for this core
pub fn is_valid_transition(from: DroneState, to: DroneState) -> bool {
    use DroneState::*;

    matches!(
        (from, to),
        (Idle | Loaded, Loading) | (Loading, Loaded) | (Loading, Idle)
    )
}
