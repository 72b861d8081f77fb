//! Error types for port operations.

/// Document library operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// Document reference does not resolve.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Storage operation failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// Library backend could not be reached.
    #[error("Library unavailable: {0}")]
    Unavailable(String),

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LibraryError {
    pub fn not_found(reference: impl ToString) -> Self {
        Self::NotFound(reference.to_string())
    }

    /// Create a Storage error with operation context.
    pub fn storage(operation: &'static str, message: impl ToString) -> Self {
        Self::Storage {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors from fetching a source page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("Request failed: {0}")]
    Request(String),
}
