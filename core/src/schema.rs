use std::collections::HashSet;

use crate::draft::ProviderDraft;
use crate::error::{SetupError, SetupResult};
use crate::types::ProviderVariant;

/// A field the draft may be required to carry.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Field {
    ProviderType,
    ApiKey,
    ApiUrl,
    ModelName,
}

/// Required/optional field set for one provider variant. Built by
/// [`schema_for`]; consumed by the collector and by pre-submit validation.
#[derive(Debug, Clone)]
pub struct ProviderSchema {
    variant: ProviderVariant,
    required: &'static [Field],
}

/// Derive the field requirements for a variant:
/// - `provider_type` is always required.
/// - `api_key` is required unless the variant is `Proxy` (key optional) or
///   `FileCredential` (the key arrives via file ingestion instead).
/// - `api_url` and `model_name` are required only for `Proxy`.
pub fn schema_for(variant: ProviderVariant) -> ProviderSchema {
    let required: &'static [Field] = match variant {
        ProviderVariant::CloudKeyed => &[Field::ProviderType, Field::ApiKey],
        ProviderVariant::FileCredential => &[Field::ProviderType],
        ProviderVariant::Proxy => &[Field::ProviderType, Field::ApiUrl, Field::ModelName],
    };
    ProviderSchema { variant, required }
}

impl ProviderSchema {
    pub fn variant(&self) -> ProviderVariant {
        self.variant
    }

    pub fn required_fields(&self) -> &'static [Field] {
        self.required
    }

    pub fn requires(&self, field: Field) -> bool {
        self.required.contains(&field)
    }

    /// Client-side validation, run before any network call. Custom config
    /// entries are string pairs by construction; here we reject empty and
    /// duplicate keys.
    pub fn validate(&self, draft: &ProviderDraft) -> SetupResult<()> {
        if draft.provider_type().trim().is_empty() {
            return Err(SetupError::Validation("Provider type is required".into()));
        }
        if self.requires(Field::ApiKey) && draft.api_key().is_empty() {
            return Err(SetupError::Validation("API Key is required".into()));
        }
        if self.requires(Field::ApiUrl) && draft.api_url().is_empty() {
            return Err(SetupError::Validation("API URL is required".into()));
        }
        if self.requires(Field::ModelName) && draft.model_name().is_none_or(str::is_empty) {
            return Err(SetupError::Validation("Model name is required".into()));
        }

        let mut seen = HashSet::new();
        for (key, _) in draft.custom_config() {
            if key.is_empty() {
                return Err(SetupError::Validation(
                    "Custom config keys must not be empty".into(),
                ));
            }
            if !seen.insert(key.as_str()) {
                return Err(SetupError::Validation(format!(
                    "Duplicate custom config key: {key}"
                )));
            }
        }
        Ok(())
    }
}
