//! External service port traits (LLM, source page fetching).

use async_trait::async_trait;
use url::Url;

use super::error::{FetchError, LlmError};

// =============================================================================
// LLM Types
// =============================================================================

/// Output format the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Constrained JSON output.
    #[default]
    Json,
    Text,
}

/// Single-shot generation request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub prompt: String,
    pub format: ResponseFormat,
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// A JSON-format request for `prompt`.
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Json,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// Response from the LLM
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The generated text (a JSON document for JSON-format requests)
    pub content: String,
    /// Model that served the request, when reported
    pub model: Option<String>,
}

impl LlmResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: None,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmPort: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;

    /// `Ok(true)` when the model server answers with a 2xx.
    async fn check_health(&self) -> Result<bool, LlmError>;
}

// =============================================================================
// Source Fetching
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentFetchPort: Send + Sync {
    /// Fetch a page and return its readable text.
    async fn fetch_text(&self, url: &Url) -> Result<String, FetchError>;
}
