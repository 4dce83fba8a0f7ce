//! Backend-facing history window

use super::{ConversationMessage, Role};
use crate::llm::LlmMessage;

/// Number of text-bearing messages sent along with a new user turn
pub const HISTORY_WINDOW: usize = 6;

/// The trailing text-bearing messages, oldest first, in backend roles.
///
/// Messages without text (tool-only replies) are skipped entirely and do
/// not count against the window.
pub fn backend_history(messages: &[ConversationMessage]) -> Vec<LlmMessage> {
    let mut window: Vec<LlmMessage> = messages
        .iter()
        .rev()
        .filter_map(|m| {
            let text = m.text.as_deref().filter(|t| !t.is_empty())?;
            Some(match m.role {
                Role::User => LlmMessage::user(text),
                Role::Assistant | Role::System => LlmMessage::model(text),
            })
        })
        .take(HISTORY_WINDOW)
        .collect();
    window.reverse();
    window
}
