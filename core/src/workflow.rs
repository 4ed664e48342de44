use std::sync::Arc;

use tracing::{info, warn};

use crate::client::{PersistenceClient, VerificationClient};
use crate::draft::ProviderDraft;
use crate::error::{SetupError, SetupResult};
use crate::schema::schema_for;

/// Where one submission attempt currently stands.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum WorkflowState {
    Idle,
    Submitting,
    Persisting,
    Succeeded,
    Failed(String),
}

/// Terminal signal reported to the caller exactly once.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Outcome {
    Confirmed,
    Cancelled,
}

/// Sequences schema validation, verification, and persistence for one
/// provider configuration transaction.
///
/// At most one submission is in flight per instance: `submit` holds the
/// mutable borrow for the whole attempt and the state machine rejects
/// re-entry. A failed attempt returns to an editable state with the draft and
/// error message retained; nothing is cached between attempts.
pub struct ProviderSetupWorkflow {
    draft: ProviderDraft,
    verifier: Arc<dyn VerificationClient>,
    persister: Arc<dyn PersistenceClient>,
    state: WorkflowState,
    outcome: Option<Outcome>,
    done: bool,
}

impl ProviderSetupWorkflow {
    pub fn new(
        draft: ProviderDraft,
        verifier: Arc<dyn VerificationClient>,
        persister: Arc<dyn PersistenceClient>,
    ) -> Self {
        Self {
            draft,
            verifier,
            persister,
            state: WorkflowState::Idle,
            outcome: None,
            done: false,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn draft(&self) -> &ProviderDraft {
        &self.draft
    }

    /// The draft stays editable between attempts. Mid-submission edits are
    /// ruled out by the mutable borrow `submit` holds.
    pub fn draft_mut(&mut self) -> &mut ProviderDraft {
        &mut self.draft
    }

    /// Message retained from the last failed attempt, for display.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Run one submission attempt: validate, verify, then commit.
    ///
    /// Persistence is never attempted unless verification succeeded for the
    /// same draft snapshot within this call. Validation failures issue no
    /// network calls at all.
    pub async fn submit(&mut self) -> SetupResult<()> {
        if self.done {
            return Err(SetupError::Validation(
                "The workflow has already completed".into(),
            ));
        }
        if matches!(
            self.state,
            WorkflowState::Submitting | WorkflowState::Persisting
        ) {
            return Err(SetupError::Validation(
                "A submission is already in progress".into(),
            ));
        }

        self.state = WorkflowState::Submitting;

        let schema = schema_for(self.draft.variant());
        if let Err(err) = schema.validate(&self.draft) {
            return Err(self.fail(err));
        }

        let verify = self.draft.verify_request();
        info!(provider = %verify.provider_type, "verifying provider configuration");
        if let Err(err) = self.verifier.verify(&verify).await {
            warn!(provider = %verify.provider_type, error = %err, "provider verification failed");
            return Err(self.fail(err));
        }

        self.state = WorkflowState::Persisting;
        let upsert = self.draft.upsert_request();
        if let Err(err) = self.persister.commit(&upsert).await {
            warn!(provider = %upsert.provider_type, error = %err, "provider commit failed");
            return Err(self.fail(err));
        }

        info!(provider = %upsert.provider_type, "provider configuration saved");
        self.state = WorkflowState::Succeeded;
        self.outcome = Some(Outcome::Confirmed);
        self.done = true;
        Ok(())
    }

    /// Abandon the workflow. Allowed only while editable (`Idle`/`Failed`);
    /// there is no mid-flight cancellation.
    pub fn cancel(&mut self) -> SetupResult<()> {
        if self.done {
            return Err(SetupError::Validation(
                "The workflow has already completed".into(),
            ));
        }
        match self.state {
            WorkflowState::Idle | WorkflowState::Failed(_) => {
                self.outcome = Some(Outcome::Cancelled);
                self.done = true;
                Ok(())
            }
            _ => Err(SetupError::Validation(
                "Cannot cancel while a submission is in flight".into(),
            )),
        }
    }

    /// Take the terminal outcome, once. Subsequent calls return `None`.
    pub fn take_outcome(&mut self) -> Option<Outcome> {
        self.outcome.take()
    }

    fn fail(&mut self, err: SetupError) -> SetupError {
        self.state = WorkflowState::Failed(err.user_message());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProviderUpsertRequest, ProviderVariant, VerifyProviderRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    #[derive(Default)]
    struct FakeVerifier {
        calls: AtomicUsize,
        reject_with: Option<String>,
        last_request: Mutex<Option<VerifyProviderRequest>>,
    }

    impl FakeVerifier {
        fn rejecting(detail: &str) -> Self {
            Self {
                reject_with: Some(detail.to_string()),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VerificationClient for FakeVerifier {
        async fn verify(&self, request: &VerifyProviderRequest) -> SetupResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.reject_with {
                Some(detail) => Err(SetupError::Verification(detail.clone())),
                None => Ok(()),
            }
        }
    }

    #[derive(Default)]
    struct FakePersister {
        calls: AtomicUsize,
        reject_with: Option<String>,
        last_request: Mutex<Option<ProviderUpsertRequest>>,
    }

    impl FakePersister {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PersistenceClient for FakePersister {
        async fn commit(&self, request: &ProviderUpsertRequest) -> SetupResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.reject_with {
                Some(detail) => Err(SetupError::Persistence(detail.clone())),
                None => Ok(()),
            }
        }
    }

    fn workflow_with(
        draft: ProviderDraft,
        verifier: Arc<FakeVerifier>,
        persister: Arc<FakePersister>,
    ) -> ProviderSetupWorkflow {
        init_logging();
        ProviderSetupWorkflow::new(draft, verifier, persister)
    }

    #[tokio::test]
    async fn test_proxy_happy_path() {
        let mut draft = ProviderDraft::new(ProviderVariant::Proxy, "LiteLLM");
        draft.set_api_url("https://x");
        draft.set_model_name("m1");

        let verifier = Arc::new(FakeVerifier::default());
        let persister = Arc::new(FakePersister::default());
        let mut workflow = workflow_with(draft, verifier.clone(), persister.clone());

        workflow.submit().await.unwrap();

        assert_eq!(*workflow.state(), WorkflowState::Succeeded);
        assert_eq!(verifier.calls(), 1);
        assert_eq!(persister.calls(), 1);
        assert_eq!(workflow.take_outcome(), Some(Outcome::Confirmed));
        assert_eq!(workflow.take_outcome(), None);

        let committed = persister.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(committed.provider_type, "litellm");
        assert!(committed.is_configured);
    }

    #[tokio::test]
    async fn test_validation_failure_issues_no_network_calls() {
        let draft = ProviderDraft::new(ProviderVariant::CloudKeyed, "OpenAI");
        let verifier = Arc::new(FakeVerifier::default());
        let persister = Arc::new(FakePersister::default());
        let mut workflow = workflow_with(draft, verifier.clone(), persister.clone());

        let err = workflow.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "API Key is required");
        assert_eq!(
            *workflow.state(),
            WorkflowState::Failed("API Key is required".to_string())
        );
        assert_eq!(verifier.calls(), 0);
        assert_eq!(persister.calls(), 0);
        assert!(workflow.take_outcome().is_none());
    }

    #[tokio::test]
    async fn test_proxy_missing_url_fails_before_network() {
        let mut draft = ProviderDraft::new(ProviderVariant::Proxy, "LiteLLM");
        draft.set_model_name("m1");
        let verifier = Arc::new(FakeVerifier::default());
        let persister = Arc::new(FakePersister::default());
        let mut workflow = workflow_with(draft, verifier.clone(), persister.clone());

        workflow.submit().await.unwrap_err();
        assert_eq!(workflow.error_message(), Some("API URL is required"));
        assert_eq!(verifier.calls(), 0);
        assert_eq!(persister.calls(), 0);
    }

    #[tokio::test]
    async fn test_verification_failure_never_persists() {
        let mut draft = ProviderDraft::new(ProviderVariant::CloudKeyed, "OpenAI");
        draft.set_api_key("sk-bad");

        let verifier = Arc::new(FakeVerifier::rejecting("bad key"));
        let persister = Arc::new(FakePersister::default());
        let mut workflow = workflow_with(draft, verifier.clone(), persister.clone());

        let err = workflow.submit().await.unwrap_err();
        assert!(matches!(err, SetupError::Verification(_)));
        assert_eq!(workflow.error_message(), Some("bad key"));
        assert_eq!(verifier.calls(), 1);
        assert_eq!(persister.calls(), 0);
    }

    #[tokio::test]
    async fn test_resubmission_reverifies_from_scratch() {
        let mut draft = ProviderDraft::new(ProviderVariant::CloudKeyed, "Cohere");
        draft.set_api_key("ck-1");

        let verifier = Arc::new(FakeVerifier::default());
        let persister = Arc::new(FakePersister {
            reject_with: Some("flaky".to_string()),
            ..Default::default()
        });
        let mut workflow = workflow_with(draft, verifier.clone(), persister.clone());

        workflow.submit().await.unwrap_err();
        assert_eq!(workflow.error_message(), Some("flaky"));

        // second attempt with unchanged draft: validation and verification rerun
        workflow.submit().await.unwrap_err();
        assert_eq!(verifier.calls(), 2);
        assert_eq!(persister.calls(), 2);
    }

    #[tokio::test]
    async fn test_cancel_from_failed_state() {
        let draft = ProviderDraft::new(ProviderVariant::CloudKeyed, "OpenAI");
        let verifier = Arc::new(FakeVerifier::default());
        let persister = Arc::new(FakePersister::default());
        let mut workflow = workflow_with(draft, verifier, persister);

        workflow.submit().await.unwrap_err();
        workflow.cancel().unwrap();
        assert_eq!(workflow.take_outcome(), Some(Outcome::Cancelled));

        // the workflow is terminal now
        assert!(workflow.submit().await.is_err());
        assert!(workflow.cancel().is_err());
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_generic_message() {
        struct BrokenVerifier;

        #[async_trait]
        impl VerificationClient for BrokenVerifier {
            async fn verify(&self, _request: &VerifyProviderRequest) -> SetupResult<()> {
                Err(SetupError::Io(std::io::Error::other("connection reset")))
            }
        }

        let mut draft = ProviderDraft::new(ProviderVariant::CloudKeyed, "OpenAI");
        draft.set_api_key("sk-1");
        let persister = Arc::new(FakePersister::default());
        let mut workflow =
            ProviderSetupWorkflow::new(draft, Arc::new(BrokenVerifier), persister.clone());

        workflow.submit().await.unwrap_err();
        assert_eq!(workflow.error_message(), Some("An unknown error occurred"));
        assert_eq!(persister.calls(), 0);
    }

    #[tokio::test]
    async fn test_file_credential_flow() {
        let mut draft = ProviderDraft::new(ProviderVariant::FileCredential, "Google");
        draft
            .ingest_credential_file("sa.json", r#"{"type":"service_account"}"#)
            .unwrap();

        let verifier = Arc::new(FakeVerifier::default());
        let persister = Arc::new(FakePersister::default());
        let mut workflow = workflow_with(draft, verifier.clone(), persister.clone());

        workflow.submit().await.unwrap();

        let verified = verifier.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(verified.provider_type, "google");
        assert_eq!(verified.api_key, r#"{"type":"service_account"}"#);
    }
}
