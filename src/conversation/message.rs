//! Conversation message and tool result types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One entry of the append-only conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_results: Option<Vec<ToolResult>>,
}

impl ConversationMessage {
    fn new(role: Role, text: Option<String>, tool_results: Option<Vec<ToolResult>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text,
            tool_results,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, Some(text.into()), None)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, Some(text.into()), None)
    }

    /// Assistant reply; an empty result list is stored as absent
    pub fn assistant(text: Option<String>, tool_results: Vec<ToolResult>) -> Self {
        let tool_results = if tool_results.is_empty() {
            None
        } else {
            Some(tool_results)
        };
        Self::new(Role::Assistant, text, tool_results)
    }
}

/// Outcome of one tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub tool: String,
    #[serde(default)]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
}

impl ToolResult {
    pub fn success(
        tool: impl Into<String>,
        result: Value,
        original_value: Option<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            tool: tool.into(),
            result,
            original_value,
            error: None,
            timestamp,
            is_premium: None,
        }
    }

    pub fn failure(tool: impl Into<String>, result: Value, error: impl Into<String>, timestamp: i64) -> Self {
        Self {
            tool: tool.into(),
            result,
            original_value: None,
            error: Some(error.into()),
            timestamp,
            is_premium: None,
        }
    }

    #[must_use]
    pub fn premium(mut self) -> Self {
        self.is_premium = Some(true);
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
