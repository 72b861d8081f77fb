//! Retrying wrapper around an [`LlmPort`].
//!
//! Network trouble is retried with exponential backoff. A model that answered
//! but produced an undecodable body is asked again at once with a stricter
//! reminder appended to the prompt. A 4xx from the server (unknown model, bad
//! request) is returned immediately. Health checks pass straight through.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

/// Appended to the prompt after an undecodable answer.
const JSON_REMINDER: &str =
    "\n\nYour previous answer could not be read. Reply with the JSON object only, no commentary.";

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Fraction of the delay randomly added or removed (0.0 disables jitter).
    pub jitter: f64,
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Backoff before retry number `retry` (1-based), capped at `max_delay`.
    fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        if self.jitter <= 0.0 {
            return delay;
        }
        let scale = rand::thread_rng().gen_range((1.0 - self.jitter)..=(1.0 + self.jitter));
        delay.mul_f64(scale.max(0.0))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(15),
            jitter: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    /// Connection refused, reset, timed out, or a 5xx.
    Transport,
    /// The server refused the request itself.
    Rejected,
    /// The model answered with something that does not decode.
    Garbled,
}

impl Failure {
    fn classify(error: &LlmError) -> Self {
        match error {
            LlmError::RequestFailed(msg) if is_client_error(msg) => Self::Rejected,
            LlmError::RequestFailed(_) => Self::Transport,
            LlmError::InvalidResponse(_) => Self::Garbled,
        }
    }
}

/// Request failures from a non-2xx answer carry the status code first.
fn is_client_error(message: &str) -> bool {
    let code = message.split_whitespace().next().unwrap_or("");
    code.len() == 3 && code.starts_with('4') && code.chars().all(|c| c.is_ascii_digit())
}

pub struct ResilientLlmClient {
    inner: Arc<dyn LlmPort>,
    config: RetryConfig,
}

impl ResilientLlmClient {
    pub fn new(inner: Arc<dyn LlmPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl LlmPort for ResilientLlmClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut request = request;
        let mut reminded = false;
        let mut retry = 0;

        loop {
            let error = match self.inner.generate(request.clone()).await {
                Ok(response) => {
                    if retry > 0 {
                        tracing::info!(retry, "Model answered after retry");
                    }
                    return Ok(response);
                }
                Err(error) => error,
            };

            let failure = Failure::classify(&error);
            if failure == Failure::Rejected {
                tracing::error!(error = %error, "Model server rejected the request");
                return Err(error);
            }
            if retry >= self.config.max_retries {
                tracing::error!(attempts = retry + 1, error = %error, "Giving up on model request");
                return Err(error);
            }
            retry += 1;

            match failure {
                Failure::Garbled => {
                    tracing::warn!(retry, error = %error, "Model answer unreadable, asking again");
                    if !reminded {
                        request.prompt.push_str(JSON_REMINDER);
                        reminded = true;
                    }
                }
                _ => {
                    let delay = self.config.backoff(retry);
                    tracing::warn!(
                        retry,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Model request failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn check_health(&self) -> Result<bool, LlmError> {
        self.inner.check_health().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockLlmPort;
    use mockall::Sequence;

    fn fast(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            jitter: 0.0,
        }
    }

    fn goblin() -> LlmResponse {
        LlmResponse::new(r#"{"name": "Goblin"}"#)
    }

    #[tokio::test]
    async fn transport_failures_are_retried() {
        let mut inner = MockLlmPort::new();
        let mut seq = Sequence::new();
        inner
            .expect_generate()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(LlmError::RequestFailed("connection reset".into())));
        inner
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(goblin()));

        let client = ResilientLlmClient::new(Arc::new(inner), fast(3));
        let response = client.generate(LlmRequest::json("prompt")).await.unwrap();

        assert_eq!(response.content, r#"{"name": "Goblin"}"#);
    }

    #[tokio::test]
    async fn unreadable_answer_is_asked_again_with_reminder() {
        let mut inner = MockLlmPort::new();
        let mut seq = Sequence::new();
        inner
            .expect_generate()
            .withf(|req| req.prompt == "prompt")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(LlmError::InvalidResponse("eof".into())));
        inner
            .expect_generate()
            .withf(|req| req.prompt.starts_with("prompt") && req.prompt.ends_with(JSON_REMINDER))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(goblin()));

        let client = ResilientLlmClient::new(Arc::new(inner), fast(2));

        assert!(client.generate(LlmRequest::json("prompt")).await.is_ok());
    }

    #[tokio::test]
    async fn reminder_is_added_once() {
        let mut inner = MockLlmPort::new();
        inner
            .expect_generate()
            .withf(|req| req.prompt.matches(JSON_REMINDER).count() <= 1)
            .times(3)
            .returning(|_| Err(LlmError::InvalidResponse("eof".into())));

        let client = ResilientLlmClient::new(Arc::new(inner), fast(2));
        let err = client.generate(LlmRequest::json("prompt")).await.unwrap_err();

        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn missing_model_is_not_retried() {
        let mut inner = MockLlmPort::new();
        inner
            .expect_generate()
            .times(1)
            .returning(|_| Err(LlmError::RequestFailed("404 model 'llama9' not found".into())));

        let client = ResilientLlmClient::new(Arc::new(inner), fast(3));

        assert!(client.generate(LlmRequest::json("prompt")).await.is_err());
    }

    #[tokio::test]
    async fn server_errors_count_as_transport() {
        let mut inner = MockLlmPort::new();
        inner
            .expect_generate()
            .times(2)
            .returning(|_| Err(LlmError::RequestFailed("503 loading model".into())));

        let client = ResilientLlmClient::new(Arc::new(inner), fast(1));

        assert!(client.generate(LlmRequest::json("prompt")).await.is_err());
    }

    #[test]
    fn client_error_codes() {
        assert!(is_client_error("404 model not found"));
        assert!(is_client_error("400"));
        assert!(!is_client_error("503 unavailable"));
        assert!(!is_client_error("error sending request for url"));
        assert!(!is_client_error("4000 tokens"));
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let config = RetryConfig {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(15),
            jitter: 0.0,
        };

        assert_eq!(config.backoff(1), Duration::from_secs(1));
        assert_eq!(config.backoff(2), Duration::from_secs(2));
        assert_eq!(config.backoff(4), Duration::from_secs(8));
        assert_eq!(config.backoff(5), Duration::from_secs(15));
    }

    #[test]
    fn jitter_stays_in_range() {
        let config = RetryConfig {
            jitter: 0.5,
            ..fast(1)
        };
        for _ in 0..20 {
            let delay = config.backoff(1);
            assert!(delay >= Duration::from_micros(400) && delay <= Duration::from_micros(1600));
        }
    }
}
