//! Tool catalog
//!
//! Every tool the model may invoke is a `ToolKind`. The registry is an
//! explicit table built once at startup mapping each kind to its
//! entitlement requirement and, for free tools, a local implementation.

mod local;
pub mod remote;

pub use remote::{HttpToolService, RemoteToolService};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Local implementation of a tool
pub type LocalToolFn = fn(Option<&str>) -> Result<Value, String>;

/// Why a tool invocation failed to produce a result
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Tool not found locally")]
    NotFoundLocally,
    #[error("{0}")]
    Local(String),
    #[error("{0}")]
    Remote(String),
}

macro_rules! tool_kinds {
    ($($variant:ident => $id:literal, $premium:literal, $desc:literal;)+) => {
        /// Closed set of tools the console knows about
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ToolKind {
            $(
                #[serde(rename = $id)]
                $variant,
            )+
        }

        impl ToolKind {
            pub const ALL: &'static [ToolKind] = &[$(ToolKind::$variant,)+];

            /// Wire identifier used by the model and the remote service
            pub fn id(self) -> &'static str {
                match self {
                    $(ToolKind::$variant => $id,)+
                }
            }

            pub fn from_id(id: &str) -> Option<Self> {
                match id {
                    $($id => Some(ToolKind::$variant),)+
                    _ => None,
                }
            }

            /// Whether using this tool needs a paid entitlement
            pub fn is_premium(self) -> bool {
                match self {
                    $(ToolKind::$variant => $premium,)+
                }
            }

            pub fn description(self) -> &'static str {
                match self {
                    $(ToolKind::$variant => $desc,)+
                }
            }
        }
    };
}

tool_kinds! {
    Ping => "ping", false, "Check connectivity of the console.";
    Uuid => "uuid", false, "Generate a random UUID.";
    Timestamp => "timestamp", false, "Report the current time.";
    EmailNormalize => "emailNormalize", false, "Normalize an email address.";
    PhoneNormalize => "phoneNormalize", true, "Normalize a phone number.";
    Hash => "hash", true, "Hash a value.";
    UrlSafety => "urlSafety", true, "Check whether a URL is safe.";
    MarketSentiment => "marketSentiment", false, "Analyze market sentiment for an asset.";
    GiftAnalysis => "giftAnalysis", false, "Suggest gifts for a recipient.";
    TrendScanner => "trendScanner", true, "Scan for trending topics.";
    CompoundCalculator => "compoundCalculator", true, "Compute compound interest.";
    PriceCheck => "priceCheck", true, "Look up the price of a product.";
    StartupGen => "startupGen", true, "Generate a startup idea.";
    HireTalent => "hireTalent", true, "Find talent for a role.";
    LearnSkill => "learnSkill", true, "Build a learning plan for a skill.";
    ArbitrageScan => "arbitrageScan", true, "Scan for arbitrage opportunities.";
    DomainSniper => "domainSniper", true, "Check domain availability.";
    CreditHack => "creditHack", true, "Suggest credit score improvements.";
    CorpArchitect => "corpArchitect", true, "Design a corporate structure.";
    IdentityShield => "identityShield", true, "Check identity exposure.";
    DataPurge => "dataPurge", true, "Request removal of personal data.";
    DustAnalysis => "dustAnalysis", true, "Analyze crypto dust balances.";
    BillNegotiator => "billNegotiator", true, "Negotiate a recurring bill.";
    ClaimRecovery => "claimRecovery", true, "Find unclaimed funds.";
    DebtDestroyer => "debtDestroyer", true, "Plan a debt payoff.";
    LegacyTimeCapsule => "legacyTimeCapsule", true, "Seal a message for the future.";
    KeySplit => "keySplit", true, "Split a secret into shares.";
    SupportHelpdesk => "supportHelpdesk", false, "Open a support request.";
    TravelAgent => "travelAgent", true, "Plan a trip.";
    NutritionScan => "nutritionScan", true, "Analyze the nutrition of a food.";
    TransportCommand => "transportCommand", true, "Arrange transport.";
    BioHackPro => "bioHackPro", true, "Suggest a health protocol.";
    EventScout => "eventScout", true, "Find events nearby.";
    CasinoRoyale => "casinoRoyale", true, "Play a game of chance.";
    CompanionMatch => "companionMatch", true, "Find a companion match.";
    AestheticArchitect => "aestheticArchitect", true, "Suggest an aesthetic makeover.";
    ViralContentGen => "viralContentGen", true, "Draft viral social content.";
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One row of the registry table
#[derive(Clone, Copy)]
pub struct ToolEntry {
    pub kind: ToolKind,
    pub requires_entitlement: bool,
    pub local: Option<LocalToolFn>,
}

impl fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolEntry")
            .field("kind", &self.kind)
            .field("requires_entitlement", &self.requires_entitlement)
            .field("local", &self.local.is_some())
            .finish()
    }
}

/// Static catalog of tools available to the console
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    entries: HashMap<ToolKind, ToolEntry>,
}

impl ToolRegistry {
    /// Build the standard catalog with all local implementations wired
    pub fn standard() -> Self {
        let entries = ToolKind::ALL
            .iter()
            .map(|&kind| {
                let entry = ToolEntry {
                    kind,
                    requires_entitlement: kind.is_premium(),
                    local: local::implementation(kind),
                };
                (kind, entry)
            })
            .collect();
        Self { entries }
    }

    /// Registry with an explicit set of entries
    #[allow(dead_code)] // Used by tests to stub local implementations
    pub fn from_entries(entries: impl IntoIterator<Item = ToolEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.kind, e)).collect(),
        }
    }

    /// Look up a tool by its wire identifier
    pub fn lookup(&self, id: &str) -> Option<&ToolEntry> {
        ToolKind::from_id(id).and_then(|kind| self.entries.get(&kind))
    }

    /// Function declarations for the model, in catalog order
    pub fn definitions(&self) -> Vec<crate::llm::ToolDefinition> {
        ToolKind::ALL
            .iter()
            .filter(|kind| self.entries.contains_key(kind))
            .map(|kind| crate::llm::ToolDefinition {
                name: kind.id().to_string(),
                description: kind.description().to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "value": {
                            "type": "string",
                            "description": "Optional input for the tool"
                        }
                    }
                }),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for &kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_id(kind.id()), Some(kind));
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, Value::String(kind.id().to_string()));
        }
        assert_eq!(ToolKind::from_id("rm_rf"), None);
    }

    #[test]
    fn test_standard_registry_covers_catalog() {
        let registry = ToolRegistry::standard();
        assert_eq!(registry.len(), ToolKind::ALL.len());
        assert_eq!(registry.definitions().len(), ToolKind::ALL.len());
    }

    #[test]
    fn test_free_tools_have_local_implementations() {
        let registry = ToolRegistry::standard();
        for &kind in ToolKind::ALL {
            let entry = registry.lookup(kind.id()).unwrap();
            assert_eq!(entry.requires_entitlement, kind.is_premium());
            if !kind.is_premium() {
                assert!(entry.local.is_some(), "{kind} has no local implementation");
            }
        }
    }

    #[test]
    fn test_premium_set() {
        let premium: Vec<_> = ToolKind::ALL.iter().filter(|k| k.is_premium()).collect();
        assert_eq!(premium.len(), 30);
        assert!(ToolKind::Hash.is_premium());
        assert!(!ToolKind::SupportHelpdesk.is_premium());
    }

    #[test]
    fn test_unknown_lookup() {
        assert!(ToolRegistry::standard().lookup("selfDestruct").is_none());
    }
}
