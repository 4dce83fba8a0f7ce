//! Pure state transition function

use super::{TurnEvent, TurnPhase};
use thiserror::Error;

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A turn is already in progress")]
    AgentBusy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function: same inputs, same output, no I/O
pub fn transition(phase: TurnPhase, event: TurnEvent) -> Result<TurnPhase, TransitionError> {
    match (phase, event) {
        (TurnPhase::Idle, TurnEvent::Submit) => Ok(TurnPhase::Submitting),

        // Single flight: nothing new starts until the current turn settles
        (TurnPhase::Submitting | TurnPhase::Completed | TurnPhase::Failed, TurnEvent::Submit) => {
            Err(TransitionError::AgentBusy)
        }

        (TurnPhase::Submitting, TurnEvent::BackendReplied) => Ok(TurnPhase::Completed),
        (TurnPhase::Submitting, TurnEvent::BackendFailed) => Ok(TurnPhase::Failed),

        // Settling is valid from anywhere so every exit path can release
        (_, TurnEvent::Settle) => Ok(TurnPhase::Idle),

        (phase, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} in {phase:?}"
        ))),
    }
}
