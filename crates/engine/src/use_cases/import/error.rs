//! Import failure taxonomy.

use chronicle_domain::DomainError;

use crate::infrastructure::ports::{FetchError, LibraryError, LlmError};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("No source text to import")]
    EmptySource,

    /// Model server, source page, or library could not be reached.
    #[error("Connection failed: {0}")]
    Connectivity(String),

    /// Model output was not JSON, or lacked what the record needs.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Model response is missing required field '{0}'")]
    MissingRequiredField(&'static str),

    #[error(transparent)]
    Library(LibraryError),
}

impl ImportError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// One-line message for the person running the import.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptySource => "Please paste some text or give a URL to import.".to_string(),
            Self::Connectivity(detail) => {
                format!("Could not connect: {detail}. Is Ollama running and reachable?")
            }
            Self::MalformedResponse(_) => "The model did not return valid JSON. \
                 Try again, or switch to a larger or different model."
                .to_string(),
            Self::MissingRequiredField(field) => format!(
                "The model response had no '{field}'. \
                 Try again, or switch to a larger or different model."
            ),
            Self::Library(e) => format!("Could not save to the content library: {e}"),
        }
    }
}

impl From<LlmError> for ImportError {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::RequestFailed(msg) => Self::Connectivity(msg),
            LlmError::InvalidResponse(msg) => Self::MalformedResponse(msg),
        }
    }
}

impl From<FetchError> for ImportError {
    fn from(error: FetchError) -> Self {
        Self::Connectivity(format!("source page: {error}"))
    }
}

impl From<LibraryError> for ImportError {
    fn from(error: LibraryError) -> Self {
        match error {
            LibraryError::Unavailable(msg) => Self::Connectivity(msg),
            other => Self::Library(other),
        }
    }
}

impl From<DomainError> for ImportError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::MissingField(field) => Self::MissingRequiredField(field),
            other => Self::MalformedResponse(other.to_string()),
        }
    }
}
