/*!
 * Common test utilities for the drillquiz-i18n test suite
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use drillquiz_i18n::content::{
    ActingUser, EntityKind, EntityStore, LocalizedEntity, LogicalField, MultilingualContentManager,
    UserSettings,
};
use drillquiz_i18n::language::Language;
use drillquiz_i18n::providers::Provider;
use drillquiz_i18n::providers::mock::MockProvider;
use drillquiz_i18n::translation::{GatewayOptions, TranslationCache, TranslationGateway};

/// Route library logs to the test output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// In-memory entity store that counts saves
#[derive(Default)]
pub struct MemoryStore {
    entities: Mutex<HashMap<String, LocalizedEntity>>,
    saves: AtomicUsize,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose every save fails
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: &str) -> Option<LocalizedEntity> {
        self.entities.lock().get(id).cloned()
    }

    pub fn insert(&self, entity: LocalizedEntity) {
        self.entities.lock().insert(entity.id().to_string(), entity);
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn load(&self, id: &str) -> Result<Option<LocalizedEntity>> {
        Ok(self.get(id))
    }

    async fn save(&self, entity: &LocalizedEntity) -> Result<()> {
        if self.fail_saves {
            return Err(anyhow!("disk full"));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.insert(entity.clone());
        Ok(())
    }
}

/// User settings from a fixed table
#[derive(Default)]
pub struct StaticUserSettings {
    languages: HashMap<String, String>,
    disabled: HashSet<String>,
    broken: bool,
}

impl StaticUserSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings source whose every lookup fails
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn with_language(mut self, user: &str, code: &str) -> Self {
        self.languages.insert(user.to_string(), code.to_string());
        self
    }

    pub fn with_auto_translate_disabled(mut self, user: &str) -> Self {
        self.disabled.insert(user.to_string());
        self
    }
}

#[async_trait]
impl UserSettings for StaticUserSettings {
    async fn language_preference(&self, user: &ActingUser) -> Result<Option<String>> {
        if self.broken {
            return Err(anyhow!("settings service unavailable"));
        }
        Ok(user.id().and_then(|id| self.languages.get(id).cloned()))
    }

    async fn is_auto_translate_enabled(&self, user: &ActingUser) -> Result<bool> {
        if self.broken {
            return Err(anyhow!("settings service unavailable"));
        }
        Ok(user.id().is_none_or(|id| !self.disabled.contains(id)))
    }
}

/// Gateway options with short timeouts for tests
pub fn test_options() -> GatewayOptions {
    GatewayOptions {
        request_timeout: Duration::from_millis(500),
        outage_cooldown: Duration::from_secs(60),
        ..GatewayOptions::default()
    }
}

/// Gateway over mock providers with a fresh cache
pub fn gateway_with(primary: &MockProvider, fallback: Option<&MockProvider>) -> TranslationGateway {
    gateway_with_options(primary, fallback, test_options())
}

pub fn gateway_with_options(
    primary: &MockProvider,
    fallback: Option<&MockProvider>,
    options: GatewayOptions,
) -> TranslationGateway {
    TranslationGateway::new(
        Arc::new(primary.clone()),
        fallback.map(|provider| Arc::new(provider.clone()) as Arc<dyn Provider>),
        TranslationCache::new(true),
        options,
    )
}

/// Manager wired to mock providers and in-memory collaborators
pub struct Harness {
    pub manager: MultilingualContentManager,
    pub store: Arc<MemoryStore>,
    pub primary: MockProvider,
    pub fallback: MockProvider,
}

impl Harness {
    pub fn new(primary: MockProvider, users: StaticUserSettings) -> Self {
        Self::with_store(primary, users, MemoryStore::new())
    }

    pub fn with_store(primary: MockProvider, users: StaticUserSettings, store: MemoryStore) -> Self {
        init_logging();
        let fallback = MockProvider::failing().named("fallback");
        let gateway = gateway_with(&primary, Some(&fallback));
        let store = Arc::new(store);
        let manager = MultilingualContentManager::new(Arc::new(gateway), store.clone(), Arc::new(users));
        Self {
            manager,
            store,
            primary,
            fallback,
        }
    }
}

/// Translation the default mock produces
pub fn tagged(text: &str, target: Language) -> String {
    MockProvider::tag_translation(text, target)
}

/// Study written in Korean with every required field set
pub fn korean_study(id: &str) -> LocalizedEntity {
    let mut entity = LocalizedEntity::new(id, EntityKind::Study, Language::Ko);
    entity.set_field(Language::Ko, LogicalField::Title, "안녕").unwrap();
    entity.set_field(Language::Ko, LogicalField::Goal, "목표").unwrap();
    entity
}

/// Question written in Korean with title, content and answer
pub fn korean_question(id: &str) -> LocalizedEntity {
    let mut entity = LocalizedEntity::new(id, EntityKind::Question, Language::Ko);
    entity.set_field(Language::Ko, LogicalField::Title, "덧셈").unwrap();
    entity.set_field(Language::Ko, LogicalField::Content, "2+2는?").unwrap();
    entity.set_field(Language::Ko, LogicalField::Answer, "4").unwrap();
    entity
}
