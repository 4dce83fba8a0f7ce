//! Turn phases

use serde::{Deserialize, Serialize};

/// Where the conversation is within a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Ready for user input
    #[default]
    Idle,
    /// User message appended, backend and tools in progress
    Submitting,
    /// Assistant reply appended
    Completed,
    /// Backend call failed, system notice appended
    Failed,
}

impl TurnPhase {
    /// Whether a turn currently holds the conversation
    pub fn is_in_flight(self) -> bool {
        !matches!(self, TurnPhase::Idle)
    }
}
