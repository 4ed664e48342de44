use thiserror::Error;

pub type SetupResult<T> = Result<T, SetupError>;

/// Error type for the provider setup workflow.
///
/// Every variant is recovered at the workflow boundary and rendered as a
/// single user-visible message; nothing here is fatal to the process.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("{0}")]
    Validation(String),
    #[error("Failed to parse JSON file. Please ensure it's a valid JSON.")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Verification(String),
    #[error("{0}")]
    Persistence(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl SetupError {
    /// The message shown to the user. Transport and I/O failures collapse to
    /// a generic message; the typed error stays available for logs.
    pub fn user_message(&self) -> String {
        match self {
            SetupError::Transport(_) | SetupError::Io(_) => {
                "An unknown error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}
