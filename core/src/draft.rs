use std::fs;
use std::path::Path;

use crate::error::{SetupError, SetupResult};
use crate::types::{
    map_to_pairs, normalize_provider_type, pairs_to_map, CustomConfigPairs, ProviderRecord,
    ProviderUpsertRequest, ProviderVariant, VerifyProviderRequest,
};

/// The in-progress, user-editable provider configuration.
///
/// One draft exists per open workflow instance. Field edits and credential
/// file ingestion mutate it; submission takes an immutable snapshot of it.
#[derive(Debug, Clone)]
pub struct ProviderDraft {
    variant: ProviderVariant,
    provider_type: String,
    api_key: String,
    api_url: String,
    model_name: Option<String>,
    model_id: i64,
    custom_config: CustomConfigPairs,
    credential_file_name: Option<String>,
}

impl ProviderDraft {
    pub fn new(variant: ProviderVariant, display_name: impl Into<String>) -> Self {
        Self {
            variant,
            provider_type: display_name.into(),
            api_key: String::new(),
            api_url: String::new(),
            model_name: None,
            model_id: 0,
            custom_config: Vec::new(),
            credential_file_name: None,
        }
    }

    /// Seed a draft from an already-persisted provider record (edit flow).
    pub fn from_existing(variant: ProviderVariant, existing: &ProviderRecord) -> Self {
        Self {
            variant,
            provider_type: existing.provider_type.clone(),
            api_key: existing.api_key.clone(),
            api_url: existing.api_url.clone(),
            model_name: None,
            model_id: 0,
            custom_config: map_to_pairs(&existing.custom_config),
            credential_file_name: None,
        }
    }

    pub fn variant(&self) -> ProviderVariant {
        self.variant
    }

    pub fn provider_type(&self) -> &str {
        &self.provider_type
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into();
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn set_api_url(&mut self, api_url: impl Into<String>) {
        self.api_url = api_url.into();
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    pub fn set_model_name(&mut self, model_name: impl Into<String>) {
        self.model_name = Some(model_name.into());
    }

    pub fn custom_config(&self) -> &[(String, String)] {
        &self.custom_config
    }

    pub fn push_custom_config(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom_config.push((key.into(), value.into()));
    }

    /// Display name of the last uploaded credential file, for user feedback.
    pub fn credential_file_name(&self) -> Option<&str> {
        self.credential_file_name.as_deref()
    }

    /// Ingest an uploaded credential file (`FileCredential` variant).
    ///
    /// The contents are parsed as JSON and re-serialized to a canonical
    /// string stored in the `api_key` slot, so the wire contract stays
    /// variant-agnostic. On parse failure the credential slot is cleared and
    /// the failed file is not retried; other fields are left untouched.
    pub fn ingest_credential_file(&mut self, file_name: &str, contents: &str) -> SetupResult<()> {
        self.credential_file_name = Some(file_name.to_string());
        match serde_json::from_str::<serde_json::Value>(contents) {
            Ok(value) => {
                self.api_key = value.to_string();
                Ok(())
            }
            Err(err) => {
                self.api_key.clear();
                Err(SetupError::Parse(err))
            }
        }
    }

    /// Read a credential file from disk and ingest it. The file bytes are
    /// not retained past the parse step.
    pub fn load_credential_file(&mut self, path: &Path) -> SetupResult<()> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                self.credential_file_name = Some(file_name);
                self.api_key.clear();
                return Err(err.into());
            }
        };
        self.ingest_credential_file(&file_name, &contents)
    }

    /// Snapshot sent to the verification endpoint.
    pub fn verify_request(&self) -> VerifyProviderRequest {
        VerifyProviderRequest {
            provider_type: normalize_provider_type(&self.provider_type),
            api_key: self.api_key.clone(),
            api_url: self.api_url.clone(),
            model_name: self.model_name.clone(),
        }
    }

    /// Snapshot sent to the persistence endpoint. Configurations created
    /// through this workflow are never the default provider, and are marked
    /// configured only here, in the committed payload.
    pub fn upsert_request(&self) -> ProviderUpsertRequest {
        ProviderUpsertRequest {
            provider_type: normalize_provider_type(&self.provider_type),
            api_key: self.api_key.clone(),
            api_url: self.api_url.clone(),
            model_name: self.model_name.clone(),
            model_id: self.model_id,
            custom_config: pairs_to_map(&self.custom_config),
            is_default_provider: false,
            is_configured: true,
        }
    }
}
