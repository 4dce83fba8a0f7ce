//! Remote tool service client
//!
//! Entitled invocations run on the hosted service, authenticated with the
//! user's key in the `x-api-key` header.

use super::{ToolError, ToolKind};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TOOL_SERVICE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_HEADER: &str = "x-api-key";
const FALLBACK_ERROR: &str = "Remote execution failed";

/// Executes tools on the remote service
#[async_trait]
pub trait RemoteToolService: Send + Sync {
    async fn invoke(
        &self,
        tool: ToolKind,
        value: Option<&str>,
        api_key: &str,
    ) -> Result<Value, ToolError>;
}

#[async_trait]
impl<T: RemoteToolService + ?Sized> RemoteToolService for Arc<T> {
    async fn invoke(
        &self,
        tool: ToolKind,
        value: Option<&str>,
        api_key: &str,
    ) -> Result<Value, ToolError> {
        (**self).invoke(tool, value, api_key).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct ServiceReply {
    #[serde(default)]
    result: Value,
    error: Option<String>,
}

/// HTTP client for the tool service
pub struct HttpToolService {
    client: Client,
    endpoint: String,
}

impl HttpToolService {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl RemoteToolService for HttpToolService {
    async fn invoke(
        &self,
        tool: ToolKind,
        value: Option<&str>,
        api_key: &str,
    ) -> Result<Value, ToolError> {
        let mut params = vec![("tool", tool.id())];
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            params.push(("value", v));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| ToolError::Remote(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::Remote(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ServiceReply>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| FALLBACK_ERROR.to_string());
            tracing::debug!(tool = %tool, status = %status, error = %message, "Remote tool rejected");
            return Err(ToolError::Remote(message));
        }

        let reply: ServiceReply = serde_json::from_str(&body)
            .map_err(|e| ToolError::Remote(format!("Malformed tool service reply: {e}")))?;
        Ok(reply.result)
    }
}
