//! API request and response types

use crate::conversation::ConversationMessage;
use serde::{Deserialize, Serialize};

/// Request to submit a turn
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Result of a submitted turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// `reply`, `failed` or `notice`
    pub outcome: &'static str,
    pub message: ConversationMessage,
}

/// The whole conversation
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<ConversationMessage>,
    pub agent_working: bool,
}

/// Console status line
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub subscription_active: bool,
    pub holiday_mode: bool,
    pub message_count: usize,
    pub agent_working: bool,
}

/// Request to set or clear the credential
#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Response after a credential change
#[derive(Debug, Serialize)]
pub struct CredentialResponse {
    pub subscription_active: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
