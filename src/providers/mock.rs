/*!
 * Mock provider implementations for testing.
 *
 * This module provides a scripted provider that simulates different behaviors:
 * - `MockProvider::working()` - Always answers with a JSON array of translations
 * - `MockProvider::intermittent(n)` - Fails every n-th request
 * - `MockProvider::failing()` - Always fails with an API error
 * - `MockProvider::rate_limited()` - Always fails with a rate limit error
 * - `MockProvider::malformed()` - Answers with prose instead of JSON
 * - `MockProvider::slow(ms)` - Sleeps before answering
 *
 * Every request is recorded so tests can assert how many calls were made and
 * for which language pairs.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::language::Language;
use crate::providers::{Provider, TranslationRequest};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Always fails with a rate limit error
    RateLimited,
    /// Answers with text that is not a JSON array
    Malformed,
    /// Answers with an array one element short
    ShortArray,
    /// Returns empty response
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// A request seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub source_language: Language,
    pub target_language: Language,
    pub texts: Vec<String>,
}

/// Per-item translation function; `None` produces a `null` element
pub type MockTranslator = fn(&str, Language) -> Option<String>;

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Name used for outage markers
    name: String,
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Requests received
    calls: Arc<Mutex<Vec<MockCall>>>,
    /// Custom per-item translation (optional)
    custom_response: Option<MockTranslator>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            name: "mock".to_string(),
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that is always over its quota
    pub fn rate_limited() -> Self {
        Self::new(MockBehavior::RateLimited)
    }

    /// Create a mock that answers with prose
    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that waits before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set the provider name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set a custom per-item translation
    pub fn with_custom_response(mut self, translator: MockTranslator) -> Self {
        self.custom_response = Some(translator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Default translation: the text tagged with the target language
    pub fn tag_translation(text: &str, target: Language) -> String {
        format!("[{}] {}", target.code(), text)
    }

    fn translate_items(&self, request: &TranslationRequest) -> Vec<Option<String>> {
        request
            .texts
            .iter()
            .map(|text| match self.custom_response {
                Some(translator) => translator(text, request.target_language),
                None => Some(Self::tag_translation(text, request.target_language)),
            })
            .collect()
    }

    fn json_response(items: &[Option<String>]) -> String {
        serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            calls: Arc::clone(&self.calls),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &TranslationRequest) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(MockCall {
            source_language: request.source_language,
            target_language: request.target_language,
            texts: request.texts.clone(),
        });

        match self.behavior {
            MockBehavior::Working => Ok(Self::json_response(&self.translate_items(request))),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::json_response(&self.translate_items(request)))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::RateLimited => Err(ProviderError::RateLimitExceeded(
                "insufficient_quota".to_string(),
            )),

            MockBehavior::Malformed => Ok("Sure! Here are your translations, one per line.".to_string()),

            MockBehavior::ShortArray => {
                let mut items = self.translate_items(request);
                items.pop();
                Ok(Self::json_response(&items))
            }

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Self::json_response(&self.translate_items(request)))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            MockBehavior::RateLimited => Err(ProviderError::RateLimitExceeded("insufficient_quota".to_string())),
            _ => Ok(()),
        }
    }
}
