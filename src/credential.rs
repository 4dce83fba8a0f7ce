//! Persisted credential
//!
//! The paid-tier key lives in a small JSON file. It is read once at startup
//! and rewritten whenever the user changes it.

use crate::entitlement::CredentialState;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Credential file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Credential file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Default location: `$HOME/.minimoe/credential.json`
pub fn default_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".minimoe").join("credential.json")
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `MINIMOE_CREDENTIAL_PATH`, or the default location
    pub fn from_env() -> Self {
        let path = std::env::var("MINIMOE_CREDENTIAL_PATH")
            .ok()
            .filter(|p| !p.is_empty())
            .map_or_else(default_path, PathBuf::from);
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored credential; a missing file means no credential
    pub fn load(&self) -> Result<CredentialState, CredentialError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(CredentialState::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist `credential`, creating the parent directory if needed
    pub async fn save(&self, credential: &CredentialState) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_string_pretty(credential)?;
        tokio::fs::write(&self.path, contents).await?;
        tracing::info!(path = %self.path.display(), present = credential.is_present(), "Credential saved");
        Ok(())
    }
}
