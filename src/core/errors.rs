use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

#[derive(Error, Debug)]
pub enum FairshareError {
    /// Non-2xx answer from the ledger API
    #[error("API {status}: {message}")]
    Api { status: u16, message: String },

    /// Request never produced a response
    #[error("{0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Form input rejected before any request was sent
    #[error("{0}")]
    Validation(String),

    /// Failure already turned into a section's banner text
    #[error("{0}")]
    Section(String),

    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),

    #[error("FAIRSHARE_API_BASE_URL is not set")]
    MissingBaseUrl,

    #[error("Invalid group id: {0}")]
    InvalidGroupId(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl FairshareError {
    pub fn validation(message: impl Into<String>) -> Self {
        FairshareError::Validation(message.into())
    }

    pub fn invalid_input(field: &str, title: &str, description: impl Into<String>) -> Self {
        FairshareError::InvalidInput(
            field.to_string(),
            FieldError {
                field: field.to_string(),
                title: title.to_string(),
                description: description.into(),
            },
        )
    }

    /// Text shown in a section's error banner. Falls back to `fallback` when the
    /// error carries nothing readable.
    pub fn banner(&self, fallback: &str) -> String {
        let message = match self {
            FairshareError::Validation(msg) => msg.clone(),
            FairshareError::InvalidInput(_, field) => field.description.clone(),
            other => other.to_string(),
        };
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

impl From<reqwest::Error> for FairshareError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FairshareError::Decode(err.to_string())
        } else {
            FairshareError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FairshareError {
    fn from(err: serde_json::Error) -> Self {
        FairshareError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for FairshareError {
    fn from(err: std::io::Error) -> Self {
        FairshareError::StorageError(err.to_string())
    }
}
