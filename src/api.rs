//! HTTP API for the console

mod handlers;
mod types;

pub use handlers::create_router;

use crate::conversation::SharedOrchestrator;
use crate::credential::CredentialStore;
use crate::entitlement::CredentialState;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SharedOrchestrator>,
    pub credential: Arc<RwLock<CredentialState>>,
    pub store: Arc<CredentialStore>,
}

impl AppState {
    pub fn new(
        orchestrator: SharedOrchestrator,
        credential: CredentialState,
        store: CredentialStore,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            credential: Arc::new(RwLock::new(credential)),
            store: Arc::new(store),
        }
    }
}
