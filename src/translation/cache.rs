/*!
 * Translation caching and provider outage tracking.
 *
 * Translated texts are memoized per (exact source text, source language,
 * target language) with an expiry. The same store keeps outage markers per
 * provider name so a failing provider is skipped until its cooldown ends.
 * Clones share storage, so one cache can back every gateway in a process.
 */

use log::{debug, info, warn};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::language::Language;

/// Default lifetime of a cached translation (30 days)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 30);

/// Default outage cooldown for a failing provider (5 minutes)
pub const DEFAULT_OUTAGE_COOLDOWN: Duration = Duration::from_secs(5 * 60);

/// Entry count above which `put` sweeps expired translations
const PURGE_THRESHOLD: usize = 4096;

/// Cache key combining the source text digest and the language pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// SHA-256 of the source text
    text_hash: String,

    /// Source language
    source_language: Language,

    /// Target language
    target_language: Language,
}

impl CacheKey {
    fn new(source_text: &str, source_language: Language, target_language: Language) -> Self {
        Self {
            text_hash: hash_text(source_text),
            source_language,
            target_language,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    /// Exact source text, compared on lookup
    source_text: String,
    translation: String,
    expires_at: Instant,
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
    pub hit_rate: f64,
    pub outaged_providers: Vec<String>,
}

/// Translation cache for storing and retrieving translations
pub struct TranslationCache {
    /// Internal cache storage
    cache: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,

    /// Provider name to end of its outage window
    outages: Arc<RwLock<HashMap<String, Instant>>>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Lifetime used by `store`
    default_ttl: Duration,

    /// Whether translation caching is enabled. Outage markers are kept either way.
    enabled: bool,
}

impl TranslationCache {
    /// Create a new translation cache
    pub fn new(enabled: bool) -> Self {
        Self::with_ttl(enabled, DEFAULT_CACHE_TTL)
    }

    /// Create a cache whose `store` uses the given lifetime
    pub fn with_ttl(enabled: bool, default_ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            outages: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            default_ttl,
            enabled,
        }
    }

    /// Get a live translation from the cache. An expired entry is evicted.
    pub fn get(
        &self,
        source_text: &str,
        source_language: Language,
        target_language: Language,
    ) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(source_text, source_language, target_language);
        let now = Instant::now();
        let found = {
            let cache = self.cache.upgradable_read();
            match cache.get(&key) {
                Some(entry) if entry.source_text != source_text => None,
                Some(entry) if entry.expires_at > now => Some(entry.translation.clone()),
                Some(_) => {
                    let mut cache = RwLockUpgradableReadGuard::upgrade(cache);
                    cache.remove(&key);
                    None
                }
                None => None,
            }
        };

        match found {
            Some(translation) => {
                *self.hits.write() += 1;
                debug!(
                    "Cache hit for '{}' ({} -> {})",
                    truncate_text(source_text, 30),
                    source_language,
                    target_language
                );
                Some(translation)
            }
            None => {
                *self.misses.write() += 1;
                debug!(
                    "Cache miss for '{}' ({} -> {})",
                    truncate_text(source_text, 30),
                    source_language,
                    target_language
                );
                None
            }
        }
    }

    /// Store a translation with an explicit lifetime
    pub fn put(
        &self,
        source_text: &str,
        source_language: Language,
        target_language: Language,
        translation: &str,
        ttl: Duration,
    ) {
        if !self.enabled {
            return;
        }

        let key = CacheKey::new(source_text, source_language, target_language);
        let entry = CacheEntry {
            source_text: source_text.to_string(),
            translation: translation.to_string(),
            expires_at: Instant::now() + ttl,
        };
        let len = {
            let mut cache = self.cache.write();
            cache.insert(key, entry);
            cache.len()
        };
        if len > PURGE_THRESHOLD {
            self.purge_expired();
        }

        debug!(
            "Cached translation for '{}' ({} -> {})",
            truncate_text(source_text, 30),
            source_language,
            target_language
        );
    }

    /// Store a translation with the default lifetime
    pub fn store(
        &self,
        source_text: &str,
        source_language: Language,
        target_language: Language,
        translation: &str,
    ) {
        self.put(
            source_text,
            source_language,
            target_language,
            translation,
            self.default_ttl,
        );
    }

    /// Whether `provider` is inside an outage window. Expired markers are dropped.
    pub fn is_provider_outaged(&self, provider: &str) -> bool {
        let mut outages = self.outages.write();
        match outages.entry(provider.to_string()) {
            Entry::Occupied(entry) if *entry.get() > Instant::now() => true,
            Entry::Occupied(entry) => {
                entry.remove();
                info!("Provider '{}' outage window ended, resuming calls", provider);
                false
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Mark `provider` as unavailable for `cooldown`
    pub fn mark_outaged(&self, provider: &str, cooldown: Duration) {
        warn!(
            "Marking provider '{}' unavailable for {}s",
            provider,
            cooldown.as_secs()
        );
        self.outages
            .write()
            .insert(provider.to_string(), Instant::now() + cooldown);
    }

    /// Time left in the outage window of `provider`
    pub fn outage_remaining(&self, provider: &str) -> Option<Duration> {
        let until = self.outages.read().get(provider).copied()?;
        until.checked_duration_since(Instant::now())
    }

    /// Lift the outage marker of `provider`
    pub fn clear_outage(&self, provider: &str) {
        if self.outages.write().remove(provider).is_some() {
            info!("Outage marker for provider '{}' cleared", provider);
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        let now = Instant::now();
        let mut outaged_providers: Vec<String> = self
            .outages
            .read()
            .iter()
            .filter(|(_, until)| **until > now)
            .map(|(name, _)| name.clone())
            .collect();
        outaged_providers.sort();

        CacheStats {
            entries: self.len(),
            hits,
            misses,
            hit_rate,
            outaged_providers,
        }
    }

    /// Drop expired translations, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut cache = self.cache.write();
        let before = cache.len();
        cache.retain(|_, entry| entry.expires_at > now);
        let removed = before - cache.len();
        if removed > 0 {
            debug!("Purged {} expired translation(s)", removed);
        }
        removed
    }

    /// Clear cached translations, counters and outage markers
    pub fn clear(&self) {
        self.cache.write().clear();
        self.outages.write().clear();
        *self.hits.write() = 0;
        *self.misses.write() = 0;

        debug!("Translation cache cleared");
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Enable or disable the cache
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Clone for TranslationCache {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            outages: self.outages.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
            default_ttl: self.default_ttl,
            enabled: self.enabled,
        }
    }
}

impl std::fmt::Debug for TranslationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationCache")
            .field("entries", &self.len())
            .field("outages", &self.outages.read().len())
            .field("default_ttl", &self.default_ttl)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Compute SHA256 hash of text
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Truncate text to a maximum number of characters with ellipsis
pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
