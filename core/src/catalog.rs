use crate::types::ProviderVariant;

/// A cloud embedding provider offered by the admin surface, with the links
/// the form points users at while they gather credentials.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CloudProvider {
    pub display_name: &'static str,
    pub variant: ProviderVariant,
    pub docs_link: &'static str,
    pub api_link: &'static str,
}

pub const KNOWN_PROVIDERS: &[CloudProvider] = &[
    CloudProvider {
        display_name: "OpenAI",
        variant: ProviderVariant::CloudKeyed,
        docs_link: "https://platform.openai.com/docs/guides/embeddings",
        api_link: "https://platform.openai.com/api-keys",
    },
    CloudProvider {
        display_name: "Cohere",
        variant: ProviderVariant::CloudKeyed,
        docs_link: "https://docs.cohere.com/docs/embeddings",
        api_link: "https://dashboard.cohere.com/api-keys",
    },
    CloudProvider {
        display_name: "Voyage AI",
        variant: ProviderVariant::CloudKeyed,
        docs_link: "https://docs.voyageai.com/docs/embeddings",
        api_link: "https://dash.voyageai.com/api-keys",
    },
    // Google authenticates with an uploaded service-account JSON file, not a
    // typed key.
    CloudProvider {
        display_name: "Google",
        variant: ProviderVariant::FileCredential,
        docs_link: "https://cloud.google.com/vertex-ai/docs/generative-ai/embeddings/get-text-embeddings",
        api_link: "https://console.cloud.google.com/iam-admin/serviceaccounts",
    },
    CloudProvider {
        display_name: "LiteLLM",
        variant: ProviderVariant::Proxy,
        docs_link: "https://docs.litellm.ai/docs/embedding/supported_embedding",
        api_link: "https://docs.litellm.ai/docs/proxy/quick_start",
    },
];

pub fn find_provider(display_name: &str) -> Option<&'static CloudProvider> {
    KNOWN_PROVIDERS
        .iter()
        .find(|provider| provider.display_name.eq_ignore_ascii_case(display_name))
}

/// Variant for a display name; unknown providers are assumed key-based.
pub fn variant_for(display_name: &str) -> ProviderVariant {
    find_provider(display_name)
        .map(|provider| provider.variant)
        .unwrap_or(ProviderVariant::CloudKeyed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_uses_file_credentials() {
        assert_eq!(variant_for("Google"), ProviderVariant::FileCredential);
        assert_eq!(variant_for("google"), ProviderVariant::FileCredential);
    }

    #[test]
    fn test_litellm_is_a_proxy() {
        assert_eq!(variant_for("LiteLLM"), ProviderVariant::Proxy);
    }

    #[test]
    fn test_unknown_provider_defaults_to_keyed() {
        assert_eq!(variant_for("Acme Embeddings"), ProviderVariant::CloudKeyed);
        assert!(find_provider("Acme Embeddings").is_none());
    }

    #[test]
    fn test_catalog_entries_are_unique() {
        for (i, provider) in KNOWN_PROVIDERS.iter().enumerate() {
            assert!(
                KNOWN_PROVIDERS[i + 1..]
                    .iter()
                    .all(|other| other.display_name != provider.display_name),
                "duplicate catalog entry: {}",
                provider.display_name
            );
        }
    }
}
