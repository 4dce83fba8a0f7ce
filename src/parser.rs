//! Extracts text and function calls from a model response

use crate::llm::{ContentBlock, LlmResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool the model asked to run, with its optional argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<String>,
}

impl ToolInvocationRequest {
    pub fn new(name: impl Into<String>, argument: Option<String>) -> Self {
        Self {
            name: name.into(),
            argument,
        }
    }
}

/// All function calls in the response, in order
pub fn extract_invocations(response: &LlmResponse) -> Vec<ToolInvocationRequest> {
    response
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::FunctionCall { name, args } => Some(ToolInvocationRequest::new(
                name.clone(),
                argument_value(args),
            )),
            ContentBlock::Text { .. } => None,
        })
        .collect()
}

/// Concatenated text of the response, `None` when there is none
pub fn extract_text(response: &LlmResponse) -> Option<String> {
    let text = response
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::FunctionCall { .. } => None,
        })
        .collect::<String>();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn argument_value(args: &Value) -> Option<String> {
    match args.get("value")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
