use serde::{Deserialize, Serialize};

/// Placeholder used when a provider has no way of reporting token decimals.
pub const UNKNOWN_DECIMALS: &str = "unknown";

/// Canonical token metadata returned by every provider.
///
/// Providers fill what their schema carries; everything else stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub website: String,
    pub twitter: String,
    pub reddit: String,
    pub telegram: String,
    pub discord: String,
    pub github: String,
    pub description: String,
    pub creator: String,
    pub deployed_block: String,
    pub deployed_tx: String,
    pub deployed_at: String,
}

impl TokenInfo {
    /// True when the record carries deployment metadata.
    pub fn has_deployment(&self) -> bool {
        !self.creator.is_empty() || !self.deployed_tx.is_empty()
    }
}

/// Provider-internal identifier for a coin or platform plus its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub id: String,
    pub name: String,
}

impl MarketInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Verified contract source as published by a block explorer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCode {
    pub source_code: String,
    pub abi: String,
    pub contract_name: String,
    pub compiler_version: String,
    pub optimization_used: String,
    pub runs: String,
    pub constructor_arguments: String,
    pub evm_version: String,
    pub library: String,
    pub license_type: String,
    pub proxy: String,
    pub implementation: String,
    pub swarm_source: String,
}
