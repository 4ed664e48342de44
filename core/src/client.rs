use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{SetupError, SetupResult};
use crate::types::{ProviderUpsertRequest, VerifyProviderRequest};

/// Requests that outlive this resolve to a transport error instead of
/// leaving the workflow stuck mid-submission.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const COMMIT_FALLBACK_MESSAGE: &str = "Failed to update provider- check your API key";

/// Error body shape shared by both collaborator endpoints.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Checks a candidate configuration against the test endpoint before
/// anything is persisted. Implementations must not mutate remote state.
#[async_trait]
pub trait VerificationClient: Send + Sync {
    async fn verify(&self, request: &VerifyProviderRequest) -> SetupResult<()>;
}

/// Durably stores an already-verified configuration via upsert semantics.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    async fn commit(&self, request: &ProviderUpsertRequest) -> SetupResult<()>;
}

pub struct HttpVerificationClient {
    client: Client,
    endpoint: String,
}

impl HttpVerificationClient {
    pub fn new(endpoint: impl Into<String>) -> SetupResult<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> SetupResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl VerificationClient for HttpVerificationClient {
    async fn verify(&self, request: &VerifyProviderRequest) -> SetupResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| format!("Provider verification failed with status {status}"));
        Err(SetupError::Verification(detail))
    }
}

pub struct HttpPersistenceClient {
    client: Client,
    endpoint: String,
}

impl HttpPersistenceClient {
    pub fn new(endpoint: impl Into<String>) -> SetupResult<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> SetupResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl PersistenceClient for HttpPersistenceClient {
    async fn commit(&self, request: &ProviderUpsertRequest) -> SetupResult<()> {
        let response = self.client.put(&self.endpoint).json(request).send().await?;

        if response.status().is_success() {
            return Ok(());
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| COMMIT_FALLBACK_MESSAGE.to_string());
        Err(SetupError::Persistence(detail))
    }
}
