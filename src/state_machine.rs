//! Turn state machine
//!
//! A conversation moves `Idle -> Submitting -> {Completed | Failed} -> Idle`
//! through a pure transition function; the orchestrator owns the I/O.

pub mod event;
pub mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use event::TurnEvent;
pub use state::TurnPhase;
pub use transition::{transition, TransitionError};
