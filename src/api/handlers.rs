//! HTTP request handlers

use super::types::{
    ChatRequest, ChatResponse, CredentialRequest, CredentialResponse, ErrorResponse,
    MessagesResponse, StatusResponse,
};
use super::AppState;
use crate::conversation::TurnRejected;
use crate::entitlement::CredentialState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/messages", get(list_messages))
        .route("/api/chat", post(send_chat))
        .route("/api/status", get(get_status))
        .route("/api/credential", put(set_credential))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Conversation
// ============================================================

async fn list_messages(State(state): State<AppState>) -> Json<MessagesResponse> {
    Json(MessagesResponse {
        messages: state.orchestrator.messages().await,
        agent_working: state.orchestrator.is_busy(),
    })
}

async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    // The turn owns a read guard on the credential until it settles, so the
    // key cannot change under it. It runs detached from this request: a
    // client that disconnects does not cut the turn short.
    let credential = state.credential.clone().read_owned().await;
    let orchestrator = state.orchestrator.clone();
    let turn = tokio::spawn(async move { orchestrator.submit_turn(&req.text, &credential).await });

    let outcome = turn
        .await
        .map_err(|e| AppError::Internal(format!("Turn task failed: {e}")))?
        .map_err(|e| match e {
            TurnRejected::EmptyInput => AppError::BadRequest(e.to_string()),
            TurnRejected::Busy => AppError::Conflict(e.to_string()),
        })?;

    Ok(Json(ChatResponse {
        outcome: outcome.kind(),
        message: outcome.message().clone(),
    }))
}

async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        subscription_active: state.credential.read().await.is_present(),
        holiday_mode: state.orchestrator.holiday_mode(),
        message_count: state.orchestrator.message_count().await,
        agent_working: state.orchestrator.is_busy(),
    })
}

// ============================================================
// Credential
// ============================================================

async fn set_credential(
    State(state): State<AppState>,
    Json(req): Json<CredentialRequest>,
) -> Result<Json<CredentialResponse>, AppError> {
    let busy = || {
        AppError::Conflict("Cannot change credential while a turn is in progress".to_string())
    };

    // A running turn holds a read guard, so the write lock is only free
    // between turns
    let mut current = state.credential.try_write().map_err(|_| busy())?;
    if state.orchestrator.is_busy() {
        return Err(busy());
    }

    let updated = CredentialState::new(req.api_key.filter(|k| !k.trim().is_empty()));
    state
        .store
        .save(&updated)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    *current = updated;

    Ok(Json(CredentialResponse {
        subscription_active: current.is_present(),
    }))
}

async fn get_version() -> &'static str {
    concat!("minimoe ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Orchestrator, SharedOrchestrator};
    use crate::credential::CredentialStore;
    use crate::dispatch::{ToolDispatcher, PAYMENT_REQUIRED};
    use crate::llm::{ContentBlock, LlmResponse, LlmService};
    use crate::testing::{FixedDisguise, GatedLlmClient, MockLlmClient, MockRemoteTools};
    use crate::tools::{RemoteToolService, ToolRegistry};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct Harness {
        state: AppState,
        llm: Arc<MockLlmClient>,
        remote: Arc<MockRemoteTools>,
        _dir: TempDir,
    }

    fn build_state(
        backend: Arc<dyn LlmService>,
        tools: Arc<dyn RemoteToolService>,
        dir: &TempDir,
    ) -> AppState {
        let orchestrator: SharedOrchestrator = Orchestrator::new(
            backend,
            ToolDispatcher::new(ToolRegistry::standard(), tools, Arc::new(FixedDisguise(false))),
        );
        let store = CredentialStore::new(dir.path().join("credential.json"));
        AppState::new(orchestrator, CredentialState::default(), store)
    }

    fn harness() -> Harness {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(MockLlmClient::new());
        let remote = Arc::new(MockRemoteTools::new());
        let state = build_state(llm.clone(), remote.clone(), &dir);

        Harness {
            state,
            llm,
            remote,
            _dir: dir,
        }
    }

    /// State whose backend holds every request until released
    fn gated_harness() -> (AppState, Arc<GatedLlmClient>, TempDir) {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(GatedLlmClient::new());
        let state = build_state(llm.clone(), Arc::new(MockRemoteTools::new()), &dir);
        (state, llm, dir)
    }

    async fn wait_until_idle(state: &AppState) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while state.orchestrator.is_busy() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    async fn call(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = create_router(state.clone())
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let h = harness();
        h.llm
            .queue_response(LlmResponse::new(vec![ContentBlock::text("ONLINE.")]));

        let (status, body) =
            call(&h.state, Method::POST, "/api/chat", Some(json!({"text": "hi"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "reply");
        assert_eq!(body["message"]["role"], "assistant");
        assert_eq!(body["message"]["text"], "ONLINE.");

        let (status, body) = call(&h.state, Method::GET, "/api/messages", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
        assert_eq!(body["agent_working"], false);
    }

    #[tokio::test]
    async fn test_empty_chat_is_bad_request() {
        let h = harness();
        let (status, body) =
            call(&h.state, Method::POST, "/api/chat", Some(json!({"text": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert!(h.llm.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_credential_unlocks_premium_tools() {
        let h = harness();

        let (_, body) = call(&h.state, Method::GET, "/api/status", None).await;
        assert_eq!(body["subscription_active"], false);
        assert_eq!(body["message_count"], 1);

        h.llm.queue_response(LlmResponse::new(vec![ContentBlock::function_call(
            "priceCheck",
            json!({"value": "PS5"}),
        )]));
        let (_, body) =
            call(&h.state, Method::POST, "/api/chat", Some(json!({"text": "PS5"}))).await;
        assert_eq!(body["message"]["toolResults"][0]["error"], PAYMENT_REQUIRED);
        assert_eq!(body["message"]["toolResults"][0]["isPremium"], true);

        let (status, body) = call(
            &h.state,
            Method::PUT,
            "/api/credential",
            Some(json!({"api_key": "k-9"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subscription_active"], true);
        assert_eq!(h.state.store.load().unwrap().key(), Some("k-9"));

        h.llm.queue_response(LlmResponse::new(vec![ContentBlock::function_call(
            "priceCheck",
            json!({"value": "PS5"}),
        )]));
        let (_, body) =
            call(&h.state, Method::POST, "/api/chat", Some(json!({"text": "PS5"}))).await;
        assert_eq!(
            body["message"]["toolResults"][0]["result"],
            json!({"remote": "priceCheck"})
        );
        assert_eq!(h.remote.recorded_calls()[0].2, "k-9");
    }

    #[tokio::test]
    async fn test_clearing_credential() {
        let h = harness();
        call(
            &h.state,
            Method::PUT,
            "/api/credential",
            Some(json!({"api_key": "k-1"})),
        )
        .await;
        let (_, body) = call(&h.state, Method::PUT, "/api/credential", Some(json!({}))).await;
        assert_eq!(body["subscription_active"], false);
        assert!(!h.state.store.load().unwrap().is_present());
    }

    #[tokio::test]
    async fn test_holiday_command_shows_in_status() {
        let h = harness();
        let (_, body) = call(
            &h.state,
            Method::POST,
            "/api/chat",
            Some(json!({"text": "init_holiday_protocol"})),
        )
        .await;
        assert_eq!(body["outcome"], "notice");
        assert_eq!(body["message"]["role"], "system");

        let (_, body) = call(&h.state, Method::GET, "/api/status", None).await;
        assert_eq!(body["holiday_mode"], true);
        assert_eq!(body["message_count"], 2);
    }

    #[tokio::test]
    async fn test_requests_during_a_turn_conflict() {
        let (state, llm, _dir) = gated_harness();
        llm.queue_response(LlmResponse::new(vec![ContentBlock::text("first")]));

        let first = {
            let state = state.clone();
            tokio::spawn(async move {
                call(&state, Method::POST, "/api/chat", Some(json!({"text": "one"}))).await
            })
        };
        llm.request_started.notified().await;

        let (status, body) =
            call(&state, Method::POST, "/api/chat", Some(json!({"text": "two"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());

        let (status, _) = call(
            &state,
            Method::PUT,
            "/api/credential",
            Some(json!({"api_key": "k-late"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(!state.store.load().unwrap().is_present());
        assert!(!state.credential.read().await.is_present());

        llm.release();
        let (status, body) = first.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"]["text"], "first");

        let (status, body) = call(
            &state,
            Method::PUT,
            "/api/credential",
            Some(json!({"api_key": "k-late"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subscription_active"], true);
    }

    #[tokio::test]
    async fn test_turn_survives_dropped_request() {
        let (state, llm, _dir) = gated_harness();
        llm.queue_response(LlmResponse::new(vec![ContentBlock::text("late reply")]));

        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            call(&state, Method::POST, "/api/chat", Some(json!({"text": "hello"}))),
        )
        .await;
        assert!(abandoned.is_err());
        llm.request_started.notified().await;

        llm.release();
        wait_until_idle(&state).await;

        let messages = state.orchestrator.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].text.as_deref(), Some("hello"));
        assert_eq!(messages[2].role, crate::conversation::Role::Assistant);
        assert_eq!(messages[2].text.as_deref(), Some("late reply"));
    }
}
