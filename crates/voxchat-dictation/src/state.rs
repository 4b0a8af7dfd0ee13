//! Recording session state machine.
//!
//! Valid transitions:
//! - Idle -> Listening (engine acquired and started)
//! - Listening -> Stopping (stop requested, engine error, or engine ended
//!   without auto-restart)
//! - Stopping -> Idle (engine handle released)
//!
//! An auto-restart swaps the engine handle without leaving Listening.

use std::fmt;

use voxchat_core::error::VoxchatError;

/// Lifecycle state of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No engine instance. Ready to activate.
    Idle,
    /// An engine is live and its events are consumed.
    Listening,
    /// The engine is being torn down; its events are ignored.
    ///
    /// Transient: teardown enters and leaves it in one synchronous call, so
    /// callers only ever observe `Idle` or `Listening`.
    Stopping,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Listening => write!(f, "Listening"),
            SessionState::Stopping => write!(f, "Stopping"),
        }
    }
}

impl SessionState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::Idle, SessionState::Listening)
                | (SessionState::Listening, SessionState::Stopping)
                | (SessionState::Stopping, SessionState::Idle)
        )
    }
}

/// Validating holder for the session state.
///
/// Everything runs on one event thread, so no locking is involved.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: SessionState,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine initialized to `Idle`.
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    pub fn current(&self) -> SessionState {
        self.state
    }

    /// Attempt to transition to the target state.
    pub fn transition(&mut self, target: SessionState) -> Result<(), VoxchatError> {
        if self.state.can_transition_to(&target) {
            tracing::debug!("Session state: {} -> {}", self.state, target);
            self.state = target;
            Ok(())
        } else {
            Err(VoxchatError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            })
        }
    }

    /// Force the state machine back to Idle (used for error recovery).
    pub fn reset(&mut self) {
        if self.state != SessionState::Idle {
            tracing::warn!("Session state machine reset to Idle from {}", self.state);
        }
        self.state = SessionState::Idle;
    }
}
