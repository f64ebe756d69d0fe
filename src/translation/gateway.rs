/*!
 * Translation gateway.
 *
 * The gateway is the only way content gets machine-translated. It fronts an
 * ordered list of providers (primary first, then fallback) and never fails a
 * batch as a whole: every input gets `Some(translation)` or `None`.
 *
 * Per call:
 * - if every provider is inside an outage window, all items are `None` and
 *   no request is made;
 * - blank texts pass through as `""`, same-language requests are copied and
 *   cached translations are served directly;
 * - the remaining texts are segmented and sent in chunks of `batch_size`,
 *   each chunk trying the providers in order. A provider that errors, times
 *   out or answers with something unparseable is marked outaged for the
 *   cooldown and the next provider takes over.
 */

use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::batch;
use super::cache::{CacheStats, TranslationCache};
use super::segments::SegmentedText;
use crate::app_config::{Config, TranslationCommonConfig};
use crate::errors::{ProviderError, TranslationError};
use crate::language::Language;
use crate::providers::{self, Provider, TranslationRequest};

/// Tunables of a gateway
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub request_timeout: Duration,
    pub outage_cooldown: Duration,
    pub cache_ttl: Duration,
    pub batch_size: usize,
    pub chunk_size: usize,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub system_prompt: String,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self::from_config(&TranslationCommonConfig::default())
    }
}

impl GatewayOptions {
    pub fn from_config(common: &TranslationCommonConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(common.request_timeout_secs),
            outage_cooldown: Duration::from_secs(common.outage_cooldown_secs),
            cache_ttl: Duration::from_secs(common.cache_ttl_secs),
            batch_size: common.batch_size.max(1),
            chunk_size: common.chunk_size.max(1),
            temperature: common.temperature,
            max_output_tokens: common.max_output_tokens,
            system_prompt: common.system_prompt.clone(),
        }
    }
}

/// Availability of one provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub available: bool,
    /// Seconds left in the outage window
    pub outage_remaining_secs: Option<u64>,
}

/// Snapshot of the gateway state
#[derive(Debug, Clone, Serialize)]
pub struct GatewayStatus {
    pub providers: Vec<ProviderStatus>,
    pub cache: CacheStats,
}

impl GatewayStatus {
    /// Whether at least one provider can currently be called
    pub fn is_available(&self) -> bool {
        self.providers.iter().any(|p| p.available)
    }
}

/// Reference from a translatable segment back to its text
struct PendingText {
    index: usize,
    segments: SegmentedText,
    /// Offset of the first segment in the flat unit list
    first_unit: usize,
}

/// Batch translator over a primary and optional fallback provider
#[derive(Debug)]
pub struct TranslationGateway {
    providers: Vec<Arc<dyn Provider>>,
    cache: TranslationCache,
    options: GatewayOptions,
}

impl TranslationGateway {
    pub fn new(
        primary: Arc<dyn Provider>,
        fallback: Option<Arc<dyn Provider>>,
        cache: TranslationCache,
        options: GatewayOptions,
    ) -> Self {
        let mut providers = vec![primary];
        providers.extend(fallback);
        Self {
            providers,
            cache,
            options,
        }
    }

    /// Build the provider chain and cache described by the configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let translation = &config.translation;
        let mut chain = Vec::new();
        for kind in translation.configured_chain() {
            let provider_config = translation.get_provider_config(&kind).ok_or_else(|| {
                anyhow::anyhow!("No configuration for {} provider", kind.display_name())
            })?;
            chain.push(providers::build_provider(&kind, provider_config, &translation.common)?);
        }

        let mut chain = chain.into_iter();
        let primary = chain
            .next()
            .ok_or_else(|| anyhow::anyhow!("No translation provider configured"))?;
        let fallback = chain.next();

        let options = GatewayOptions::from_config(&translation.common);
        let cache = TranslationCache::with_ttl(translation.common.cache_enabled, options.cache_ttl);

        Ok(Self::new(primary, fallback, cache, options))
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn options(&self) -> &GatewayOptions {
        &self.options
    }

    /// Whether every provider is inside an outage window
    pub fn all_providers_outaged(&self) -> bool {
        self.providers
            .iter()
            .all(|provider| self.cache.is_provider_outaged(provider.name()))
    }

    /// Translate `texts` from `source` to `target`.
    ///
    /// Returns one entry per input in the same order; `None` marks an item
    /// that could not be translated. Provider failures are absorbed here.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> Vec<Option<String>> {
        if texts.is_empty() {
            return Vec::new();
        }

        if self.all_providers_outaged() {
            warn!(
                "All translation providers unavailable, skipping {} text(s) {} -> {}",
                texts.len(),
                source,
                target
            );
            return vec![None; texts.len()];
        }

        let mut results: Vec<Option<String>> = vec![None; texts.len()];
        let mut pending = Vec::new();
        let mut units: Vec<String> = Vec::new();

        for (index, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                results[index] = Some(String::new());
            } else if source == target {
                results[index] = Some(text.clone());
            } else if let Some(cached) = self.cache.get(text, source, target) {
                results[index] = Some(cached);
            } else {
                let segments = SegmentedText::split(text, self.options.chunk_size);
                let first_unit = units.len();
                units.extend(segments.translatable().map(str::to_string));
                pending.push(PendingText {
                    index,
                    segments,
                    first_unit,
                });
            }
        }

        if units.is_empty() {
            return results;
        }

        debug!(
            "Translating {} text(s) as {} segment(s) {} -> {}",
            pending.len(),
            units.len(),
            source,
            target
        );

        let mut translated_units: Vec<Option<String>> = Vec::with_capacity(units.len());
        for chunk in units.chunks(self.options.batch_size) {
            translated_units.extend(self.translate_chunk(chunk, source, target).await);
        }

        for text in pending {
            let count = text.segments.translatable_count();
            let parts: Option<Vec<String>> = translated_units
                [text.first_unit..text.first_unit + count]
                .iter()
                .cloned()
                .collect();

            let Some(translation) = parts.and_then(|parts| text.segments.reassemble(&parts)) else {
                continue;
            };

            self.cache.put(
                &texts[text.index],
                source,
                target,
                &translation,
                self.options.cache_ttl,
            );
            results[text.index] = Some(translation);
        }

        let failed = results.iter().filter(|r| r.is_none()).count();
        if failed > 0 {
            warn!(
                "{} of {} text(s) could not be translated {} -> {}",
                failed,
                texts.len(),
                source,
                target
            );
        }

        results
    }

    /// Translate one text, surfacing failure as an error
    pub async fn translate_text(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError> {
        let mut translations = self
            .translate_texts(&[text.to_string()], source, target)
            .await?;
        Ok(translations.pop().unwrap_or_default())
    }

    /// Translate every text or fail. Used for user-initiated translation
    /// where a silent miss is not acceptable.
    pub async fn translate_texts(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> Result<Vec<String>, TranslationError> {
        if self.all_providers_outaged() && texts.iter().any(|t| !t.trim().is_empty()) {
            return Err(TranslationError::AllProvidersUnavailable);
        }

        let results = self.translate_batch(texts, source, target).await;
        let failed = results.iter().filter(|r| r.is_none()).count();
        if failed > 0 {
            return Err(TranslationError::Failed {
                source_language: source,
                target_language: target,
                failed,
                total: texts.len(),
            });
        }

        Ok(results.into_iter().flatten().collect())
    }

    /// Provider availability and cache statistics
    pub fn status(&self) -> GatewayStatus {
        let providers = self
            .providers
            .iter()
            .map(|provider| {
                let name = provider.name().to_string();
                let available = !self.cache.is_provider_outaged(&name);
                let outage_remaining_secs = if available {
                    None
                } else {
                    self.cache.outage_remaining(&name).map(|d| d.as_secs())
                };
                ProviderStatus {
                    name,
                    available,
                    outage_remaining_secs,
                }
            })
            .collect();

        GatewayStatus {
            providers,
            cache: self.cache.stats(),
        }
    }

    /// Probe every provider, clearing the outage marker of those that answer
    pub async fn probe_providers(&self) -> Vec<(String, Result<(), ProviderError>)> {
        let mut results = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let probe = provider.test_connection();
            let outcome = match tokio::time::timeout(self.options.request_timeout, probe).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ProviderError::Timeout(self.options.request_timeout.as_secs())),
            };
            if outcome.is_ok() {
                self.cache.clear_outage(provider.name());
            }
            results.push((provider.name().to_string(), outcome));
        }
        results
    }

    async fn translate_chunk(
        &self,
        chunk: &[String],
        source: Language,
        target: Language,
    ) -> Vec<Option<String>> {
        for provider in &self.providers {
            if self.cache.is_provider_outaged(provider.name()) {
                debug!("Skipping provider '{}' (outage window)", provider.name());
                continue;
            }

            match self.request(provider.as_ref(), chunk, source, target).await {
                Ok(items) => {
                    info!(
                        "Provider '{}' translated {}/{} segment(s) {} -> {}",
                        provider.name(),
                        items.iter().filter(|i| i.is_some()).count(),
                        chunk.len(),
                        source,
                        target
                    );
                    return items;
                }
                Err(e) => {
                    warn!("Provider '{}' failed: {}", provider.name(), e);
                    self.cache.mark_outaged(provider.name(), self.options.outage_cooldown);
                }
            }
        }

        vec![None; chunk.len()]
    }

    async fn request(
        &self,
        provider: &dyn Provider,
        chunk: &[String],
        source: Language,
        target: Language,
    ) -> Result<Vec<Option<String>>, ProviderError> {
        let request = TranslationRequest::new(chunk.to_vec(), source, target)
            .system_prompt_template(&self.options.system_prompt)
            .temperature(self.options.temperature)
            .max_tokens_cap(self.options.max_output_tokens);

        let call = provider.complete(&request);
        let raw = match tokio::time::timeout(self.options.request_timeout, call).await {
            Ok(result) => result?,
            Err(_) => return Err(ProviderError::Timeout(self.options.request_timeout.as_secs())),
        };

        batch::parse_translations(&raw, chunk.len())
    }
}
