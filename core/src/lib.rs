pub mod catalog;
pub mod client;
pub mod draft;
pub mod error;
pub mod schema;
pub mod types;
pub mod workflow;

pub use client::{
    HttpPersistenceClient, HttpVerificationClient, PersistenceClient, VerificationClient,
};
pub use draft::ProviderDraft;
pub use error::{SetupError, SetupResult};
pub use types::ProviderVariant;
pub use workflow::{Outcome, ProviderSetupWorkflow, WorkflowState};
