//! Recording session state.
//!
//! A push-to-talk session only has two states:
//! - Idle -> Recording (trigger pressed, worker started)
//! - Recording -> Idle (trigger released, worker stopped)
//!
//! The state value is owned by the session controller and mutated under its
//! single lock, together with the worker handle it describes.

use std::fmt;

/// Operational state of the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No recording in progress. Ready to start.
    Idle,
    /// A transcription worker is live and consuming audio.
    Recording,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Recording => write!(f, "Recording"),
        }
    }
}

impl SessionState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::Idle, SessionState::Recording)
                | (SessionState::Recording, SessionState::Idle)
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
