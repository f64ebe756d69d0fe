/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the LLM providers used to
 * translate content:
 * - OpenAI: chat completions API
 * - Gemini: Google Generative Language API
 * - Anthropic: messages API
 * - Mock: scripted provider for tests
 *
 * Every provider receives a batch of texts and answers with the raw model
 * output, which is expected to be a JSON array with one translation per
 * input. Parsing and validation of that output is the gateway's job.
 */

use anyhow::Context;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{ProviderConfig, TranslationCommonConfig, TranslationProvider};
use crate::errors::ProviderError;
use crate::language::Language;
use crate::translation::batch;

/// A batch translation request handed to a provider
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Texts to translate, in order
    pub texts: Vec<String>,
    /// Language of every text
    pub source_language: Language,
    /// Language to translate into
    pub target_language: Language,
    /// Instructions for the model
    pub system_prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Output token budget
    pub max_tokens: u32,
}

impl TranslationRequest {
    /// Create a request with prompt and budget derived from the texts
    pub fn new(texts: Vec<String>, source_language: Language, target_language: Language) -> Self {
        let max_tokens = batch::estimate_max_tokens(&texts, batch::MAX_OUTPUT_TOKENS);
        Self {
            texts,
            source_language,
            target_language,
            system_prompt: batch::build_system_prompt(
                batch::DEFAULT_SYSTEM_PROMPT,
                source_language,
                target_language,
            ),
            temperature: 0.3,
            max_tokens,
        }
    }

    /// Set the system prompt from a template with `{source_language}` and
    /// `{target_language}` placeholders
    pub fn system_prompt_template(mut self, template: &str) -> Self {
        self.system_prompt = batch::build_system_prompt(template, self.source_language, self.target_language);
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the output token budget
    pub fn max_tokens_cap(mut self, cap: u32) -> Self {
        self.max_tokens = batch::estimate_max_tokens(&self.texts, cap);
        self
    }

    /// User message listing the texts as a JSON array
    pub fn user_prompt(&self) -> String {
        batch::build_user_prompt(&self.texts, self.source_language, self.target_language)
    }
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably as primary or fallback by the gateway.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Stable name, used for outage markers and logs
    fn name(&self) -> &str;

    /// Send a batch translation request and return the raw model output
    async fn complete(&self, request: &TranslationRequest) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Build a provider client from its configuration
pub fn build_provider(
    kind: &TranslationProvider,
    config: &ProviderConfig,
    common: &TranslationCommonConfig,
) -> anyhow::Result<Arc<dyn Provider>> {
    if !config.endpoint.is_empty() {
        url::Url::parse(&config.endpoint).with_context(|| {
            format!("Invalid endpoint for {} provider: {}", kind.display_name(), config.endpoint)
        })?;
    }

    let timeout_secs = if config.timeout_secs > 0 {
        config.timeout_secs
    } else {
        common.request_timeout_secs
    };

    let provider: Arc<dyn Provider> = match kind {
        TranslationProvider::OpenAI => Arc::new(openai::OpenAI::new(
            config.api_key.clone(),
            config.endpoint.clone(),
            config.model.clone(),
            timeout_secs,
        )),
        TranslationProvider::Gemini => Arc::new(gemini::Gemini::new(
            config.api_key.clone(),
            config.endpoint.clone(),
            config.model.clone(),
            timeout_secs,
        )),
        TranslationProvider::Anthropic => Arc::new(anthropic::Anthropic::new(
            config.api_key.clone(),
            config.endpoint.clone(),
            config.model.clone(),
            timeout_secs,
        )),
    };

    Ok(provider)
}

/// Map a transport error, reporting client-side timeouts as such
pub(crate) fn send_error(error: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        error.into()
    }
}

/// Turn a non-success HTTP response into a provider error
pub(crate) async fn error_from_response(provider: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    log::error!("{} API error ({}): {}", provider, status, error_text);
    ProviderError::from_status(status.as_u16(), &error_text)
}

pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod openai;
