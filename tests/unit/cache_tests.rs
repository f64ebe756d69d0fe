/*!
 * Tests for translation cache functionality
 */

use std::time::Duration;

use drillquiz_i18n::language::Language;
use drillquiz_i18n::translation::TranslationCache;

#[test]
fn test_cache_new_withDisabled_shouldNeverHit() {
    let cache = TranslationCache::new(false);
    cache.store("hello", Language::En, Language::Ko, "안녕");

    assert!(cache.get("hello", Language::En, Language::Ko).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_cache_store_withEnabledCache_shouldStoreTranslation() {
    let cache = TranslationCache::new(true);
    cache.store("hello", Language::En, Language::Ko, "안녕");

    assert_eq!(cache.get("hello", Language::En, Language::Ko), Some("안녕".to_string()));
}

#[test]
fn test_cache_get_withDifferentLanguages_shouldReturnNone() {
    let cache = TranslationCache::new(true);
    cache.store("hello", Language::En, Language::Ko, "안녕");

    assert!(cache.get("hello", Language::Es, Language::Ko).is_none());
    assert!(cache.get("hello", Language::En, Language::Ja).is_none());
}

#[test]
fn test_cache_get_withSimilarText_shouldNotMatch() {
    let cache = TranslationCache::new(true);
    cache.store("Hello", Language::En, Language::Ko, "안녕");

    assert!(cache.get("hello", Language::En, Language::Ko).is_none());
    assert!(cache.get("Hello ", Language::En, Language::Ko).is_none());
}

#[test]
fn test_cache_store_withSameKey_shouldOverwrite() {
    let cache = TranslationCache::new(true);
    cache.store("hello", Language::En, Language::Es, "hola");
    cache.store("hello", Language::En, Language::Es, "buenas");

    assert_eq!(cache.get("hello", Language::En, Language::Es), Some("buenas".to_string()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_put_withElapsedTtl_shouldMiss() {
    let cache = TranslationCache::new(true);
    cache.put("hello", Language::En, Language::Ja, "こんにちは", Duration::ZERO);

    assert!(cache.get("hello", Language::En, Language::Ja).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_cache_purgeExpired_shouldDropOnlyStaleEntries() {
    let cache = TranslationCache::new(true);
    cache.put("old", Language::En, Language::Ja, "古い", Duration::ZERO);
    cache.store("new", Language::En, Language::Ja, "新しい");

    assert_eq!(cache.purge_expired(), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("new", Language::En, Language::Ja), Some("新しい".to_string()));
}

#[test]
fn test_cache_get_withExpiredEntries_shouldEvictThem() {
    let cache = TranslationCache::new(true);
    for i in 0..1000 {
        let text = format!("question {}", i);
        cache.put(&text, Language::Ko, Language::En, "x", Duration::ZERO);
        assert!(cache.get(&text, Language::Ko, Language::En).is_none());
    }

    assert!(cache.is_empty());
    assert_eq!(cache.stats().misses, 1000);
}

#[test]
fn test_cache_put_withManyExpiredEntries_shouldSweepThem() {
    let cache = TranslationCache::new(true);
    for i in 0..5000 {
        cache.put(&format!("answer {}", i), Language::Ko, Language::Es, "x", Duration::ZERO);
    }
    cache.store("kept", Language::Ko, Language::Es, "guardado");

    assert!(cache.len() < 1000);
    assert_eq!(cache.get("kept", Language::Ko, Language::Es), Some("guardado".to_string()));
}

#[test]
fn test_cache_stats_shouldCountHitsAndMisses() {
    let cache = TranslationCache::new(true);
    cache.store("one", Language::En, Language::Zh, "一");

    cache.get("one", Language::En, Language::Zh);
    cache.get("one", Language::En, Language::Zh);
    cache.get("two", Language::En, Language::Zh);

    let stats = cache.stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_cache_clone_shouldShareEntries() {
    let cache = TranslationCache::new(true);
    let cloned = cache.clone();

    cloned.store("hello", Language::En, Language::Ko, "안녕");

    assert_eq!(cache.get("hello", Language::En, Language::Ko), Some("안녕".to_string()));
}

#[test]
fn test_markOutaged_shouldLastForCooldown() {
    let cache = TranslationCache::new(true);
    cache.mark_outaged("openai", Duration::from_secs(60));

    assert!(cache.is_provider_outaged("openai"));
    assert!(!cache.is_provider_outaged("gemini"));
    assert!(cache.outage_remaining("openai").is_some());
    assert_eq!(cache.stats().outaged_providers, vec!["openai".to_string()]);
}

#[test]
fn test_markOutaged_withElapsedCooldown_shouldRecover() {
    let cache = TranslationCache::new(true);
    cache.mark_outaged("openai", Duration::from_millis(10));

    std::thread::sleep(Duration::from_millis(30));

    assert!(!cache.is_provider_outaged("openai"));
    assert!(cache.outage_remaining("openai").is_none());
}

#[test]
fn test_isProviderOutaged_withConcurrentMark_shouldKeepFreshMarker() {
    let cache = TranslationCache::new(true);

    for _ in 0..500 {
        cache.mark_outaged("openai", Duration::ZERO);

        let checker = {
            let cache = cache.clone();
            std::thread::spawn(move || cache.is_provider_outaged("openai"))
        };
        let marker = {
            let cache = cache.clone();
            std::thread::spawn(move || cache.mark_outaged("openai", Duration::from_secs(300)))
        };
        checker.join().unwrap();
        marker.join().unwrap();

        assert!(cache.is_provider_outaged("openai"));
    }
}

#[test]
fn test_outageMarkers_withDisabledCache_shouldStillApply() {
    let cache = TranslationCache::new(false);
    cache.mark_outaged("gemini", Duration::from_secs(60));

    assert!(cache.is_provider_outaged("gemini"));

    cache.clear_outage("gemini");
    assert!(!cache.is_provider_outaged("gemini"));
}

#[test]
fn test_clear_shouldDropEntriesAndOutages() {
    let cache = TranslationCache::new(true);
    cache.store("hello", Language::En, Language::Ko, "안녕");
    cache.mark_outaged("openai", Duration::from_secs(60));

    cache.clear();

    assert!(cache.is_empty());
    assert!(!cache.is_provider_outaged("openai"));
}
