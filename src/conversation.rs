//! Conversation model and turn orchestration

mod message;
mod orchestrator;
mod window;

pub use message::{ConversationMessage, Role, ToolResult};
#[allow(unused_imports)] // Public API re-exports
pub use orchestrator::{
    Orchestrator, SharedOrchestrator, TurnOutcome, TurnRejected, HOLIDAY_COMMAND,
};
