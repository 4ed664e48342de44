use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The category of provider being configured. The active variant fully
/// determines which fields the draft must carry before submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub enum ProviderVariant {
    /// A cloud provider authenticated by an opaque API key.
    CloudKeyed,
    /// A provider whose credential is a structured JSON blob uploaded as a
    /// file (e.g. a service-account file) rather than typed text.
    FileCredential,
    /// A self-hosted proxy reached by URL; the key is optional, but a model
    /// name is needed for the verification call.
    Proxy,
}

/// Wire identifier for a provider: lower-cased first token of the display
/// name, so "Voyage AI" becomes "voyage".
pub fn normalize_provider_type(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Custom config is edited as an ordered list of key/value pairs and only
/// collapsed into a mapping at submission time.
pub type CustomConfigPairs = Vec<(String, String)>;

pub fn pairs_to_map(pairs: &[(String, String)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

pub fn map_to_pairs(map: &IndexMap<String, String>) -> CustomConfigPairs {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// Body of the POST to the verification (test) endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct VerifyProviderRequest {
    pub provider_type: String,
    pub api_key: String,
    pub api_url: String,
    pub model_name: Option<String>,
}

/// Body of the PUT to the persistence endpoint. Upsert semantics: the remote
/// end replaces any existing configuration for the same `provider_type`.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ProviderUpsertRequest {
    pub provider_type: String,
    pub api_key: String,
    pub api_url: String,
    pub model_name: Option<String>,
    pub model_id: i64,
    pub custom_config: IndexMap<String, String>,
    pub is_default_provider: bool,
    pub is_configured: bool,
}

/// An already-persisted provider configuration, as returned by the host
/// application. Edit flows seed a fresh draft from one of these.
#[derive(Debug, Clone, Serialize, Deserialize, Default, Eq, PartialEq)]
pub struct ProviderRecord {
    pub provider_type: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub custom_config: IndexMap<String, String>,
}
