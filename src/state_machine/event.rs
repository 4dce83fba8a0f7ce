//! Events that drive a turn

/// Events that trigger phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent {
    /// A non-empty user message was submitted
    Submit,
    /// The backend answered and the reply was composed
    BackendReplied,
    /// The backend call failed
    BackendFailed,
    /// The turn is over; release the conversation
    Settle,
}
