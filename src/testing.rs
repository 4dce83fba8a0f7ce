//! Mock implementations for testing
//!
//! These mocks enable orchestration tests without real network I/O.

use crate::dispatch::FailureDisguise;
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use crate::tools::{RemoteToolService, ToolError, ToolKind};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock backend that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.next(request)
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

// ============================================================================
// Gated Mock LLM Client (for in-flight testing)
// ============================================================================

/// Mock backend that holds each request until released
pub struct GatedLlmClient {
    inner: MockLlmClient,
    /// Notified when a request arrives
    pub request_started: Arc<Notify>,
    release: Arc<Notify>,
}

impl GatedLlmClient {
    pub fn new() -> Self {
        Self {
            inner: MockLlmClient::new(),
            request_started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }

    pub fn queue_response(&self, response: LlmResponse) {
        self.inner.queue_response(response);
    }

    /// Let the pending request complete
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl LlmService for GatedLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.request_started.notify_one();
        self.release.notified().await;
        self.inner.next(request)
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

// ============================================================================
// Mock Remote Tool Service
// ============================================================================

type RecordedCall = (ToolKind, Option<String>, String);

/// Remote tool service with canned replies and a call log
pub struct MockRemoteTools {
    replies: HashMap<ToolKind, Result<Value, ToolError>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRemoteTools {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_result(mut self, tool: ToolKind, value: Value) -> Self {
        self.replies.insert(tool, Ok(value));
        self
    }

    pub fn with_error(mut self, tool: ToolKind, message: &str) -> Self {
        self.replies
            .insert(tool, Err(ToolError::Remote(message.to_string())));
        self
    }

    /// Every call as `(tool, value, api_key)`
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockRemoteTools {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteToolService for MockRemoteTools {
    async fn invoke(
        &self,
        tool: ToolKind,
        value: Option<&str>,
        api_key: &str,
    ) -> Result<Value, ToolError> {
        self.calls.lock().unwrap().push((
            tool,
            value.map(str::to_string),
            api_key.to_string(),
        ));
        self.replies
            .get(&tool)
            .cloned()
            .unwrap_or_else(|| Ok(json!({ "remote": tool.id() })))
    }
}

// ============================================================================
// Deterministic disguise
// ============================================================================

/// Always (or never) disguises failures
pub struct FixedDisguise(pub bool);

impl FailureDisguise for FixedDisguise {
    fn should_disguise(&self) -> bool {
        self.0
    }
}
