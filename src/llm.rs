//! LLM backend abstraction
//!
//! The orchestrator only sees `LlmService`; the Gemini adapter is the
//! production implementation.

mod error;
mod gemini;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use gemini::GeminiService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the model backend
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    /// Alternative base URL (e.g. a local proxy). The key is implicit there.
    pub gateway: Option<String>,
    pub model: Option<String>,
    pub timeout: Option<Duration>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            gateway: std::env::var("LLM_GATEWAY").ok(),
            model: std::env::var("MINIMOE_MODEL").ok(),
            timeout: parse_timeout_secs(std::env::var("MINIMOE_LLM_TIMEOUT_SECS").ok().as_deref()),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Whether enough is configured to reach a backend
    pub fn is_configured(&self) -> bool {
        self.gemini_api_key.is_some() || self.gateway.is_some()
    }
}

/// Positive whole seconds; anything else leaves the client default
pub fn parse_timeout_secs(raw: Option<&str>) -> Option<Duration> {
    raw?.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Common interface for model backends
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T: LlmService + ?Sized> LlmService for Arc<T> {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        (**self).complete(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    history = request.messages.len(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    transient = e.kind.is_transient(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Build the production backend, wrapped with logging
pub fn build_service(config: &LlmConfig) -> Result<Arc<dyn LlmService>, LlmError> {
    let api_key = match (&config.gemini_api_key, &config.gateway) {
        (Some(key), _) => key.clone(),
        (None, Some(_)) => "implicit".to_string(),
        (None, None) => {
            return Err(LlmError::auth(
                "No model backend configured. Set GEMINI_API_KEY or LLM_GATEWAY.",
            ))
        }
    };

    let service = GeminiService::new(
        api_key,
        config.model_name(),
        config.gateway.as_deref(),
        config.timeout,
    )?;
    Ok(Arc::new(LoggingService::new(Arc::new(service))))
}
