//! Application composition.

use std::sync::Arc;

use crate::infrastructure::{
    config::ImportConfig,
    memory_library::MemoryLibrary,
    ollama::OllamaClient,
    ports::LlmPort,
    resilient_llm::{ResilientLlmClient, RetryConfig},
    web_fetch::WebPageFetcher,
};
use crate::use_cases::ImportPipeline;

/// Page fetches are quick compared to model calls.
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Wired-up import engine.
pub struct App {
    pub library: Arc<MemoryLibrary>,
    pub pipeline: ImportPipeline,
}

impl App {
    pub fn new(config: ImportConfig, library: Arc<MemoryLibrary>) -> Self {
        let pipeline = ImportPipeline::new(
            llm_client(&config),
            library.clone(),
            Arc::new(WebPageFetcher::new(FETCH_TIMEOUT_SECS)),
            config,
        );
        Self { library, pipeline }
    }
}

fn llm_client(config: &ImportConfig) -> Arc<dyn LlmPort> {
    let ollama = Arc::new(OllamaClient::with_timeout(
        &config.llm.base_url,
        &config.llm.model,
        config.llm.timeout_secs,
    ));
    if config.llm.max_retries == 0 {
        return ollama;
    }

    let retry = RetryConfig::default().with_max_retries(config.llm.max_retries);
    tracing::info!(
        max_retries = retry.max_retries,
        base_delay_ms = retry.base_delay.as_millis() as u64,
        "LLM client configured with retry"
    );
    Arc::new(ResilientLlmClient::new(ollama, retry))
}
