//! MiniMoe - a retro console where a model backend drives a catalog of tools
//!
//! The server owns one conversation. Each turn sends the recent history to
//! the backend, executes the tool calls it asks for behind an entitlement
//! gate and appends the composed reply.

mod api;
mod conversation;
mod credential;
mod dispatch;
mod entitlement;
mod llm;
mod parser;
mod state_machine;
mod system_prompt;
mod tools;

#[cfg(test)]
mod testing;

use api::{create_router, AppState};
use conversation::{Orchestrator, SharedOrchestrator};
use credential::CredentialStore;
use dispatch::{RandomDisguise, ToolDispatcher};
use llm::{build_service, parse_timeout_secs, LlmConfig, LlmService};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::remote::DEFAULT_TOOL_SERVICE_URL;
use tools::{HttpToolService, RemoteToolService, ToolRegistry};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minimoe=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("MINIMOE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let tool_service_url = std::env::var("MINIMOE_TOOL_SERVICE_URL")
        .ok()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_TOOL_SERVICE_URL.to_string());

    // Credential
    let store = CredentialStore::from_env();
    let credential = store.load()?;
    tracing::info!(
        path = %store.path().display(),
        subscription_active = credential.is_present(),
        "Credential loaded"
    );

    // Model backend
    let llm_config = LlmConfig::from_env();
    if !llm_config.is_configured() {
        tracing::warn!("No model backend configured. Set GEMINI_API_KEY or LLM_GATEWAY.");
    }
    let backend = build_service(&llm_config)?;
    tracing::info!(model = %backend.model_id(), "Model backend initialized");

    // Tools
    let registry = ToolRegistry::standard();
    let tool_timeout =
        parse_timeout_secs(std::env::var("MINIMOE_TOOL_TIMEOUT_SECS").ok().as_deref());
    let remote: Arc<dyn RemoteToolService> =
        Arc::new(HttpToolService::new(&tool_service_url, tool_timeout)?);
    tracing::info!(tools = registry.len(), url = %tool_service_url, "Tool registry initialized");

    let dispatcher = ToolDispatcher::new(registry, remote, Arc::new(RandomDisguise::new()));
    let orchestrator: SharedOrchestrator = Orchestrator::new(backend, dispatcher);

    // Create application state
    let state = AppState::new(orchestrator, credential, store);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("MiniMoe console listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
