//! Entitlement gate
//!
//! Premium tools need a credential. Presence of a key is enough here; an
//! invalid key surfaces later as a remote execution failure.

use crate::tools::ToolEntry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The user's credential for the paid tier
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl CredentialState {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    #[allow(dead_code)] // Test and API convenience
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The key, if one is set and non-blank
    pub fn key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn is_present(&self) -> bool {
        self.key().is_some()
    }
}

// Keep keys out of logs.
impl fmt::Debug for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialState")
            .field("api_key", &self.key().map(|_| "<redacted>"))
            .finish()
    }
}

/// Decide whether the registry row `entry` may run under `credential`
pub fn is_allowed(entry: &ToolEntry, credential: &CredentialState) -> bool {
    !entry.requires_entitlement || credential.is_present()
}
