/*!
 * Multilingual content manager.
 *
 * Orchestrates a content update: decide which target-language fields are
 * missing, translate them through the gateway (one call per language pair),
 * write the results, refresh completion flags and the supported set, and
 * persist the entity once.
 *
 * Per update cycle an entity goes through
 * `SourceWritten -> TranslationRequested -> {Applied | Partial | Skipped}
 * -> FlagsRecomputed -> Persisted`. There is no failure terminal state:
 * items the gateway could not translate are left empty and their language
 * flags keep describing the fields as they are. When the acting user has
 * auto-translation turned off the cycle stops before anything is written.
 */

use log::{debug, error, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::completion;
use super::entity::{LocalizedEntity, is_blank};
use super::fields::{EntityKind, LogicalField};
use super::store::EntityStore;
use super::users::{ActingUser, UserSettings};
use crate::errors::ContentError;
use crate::language::Language;
use crate::translation::TranslationGateway;

/// What changed in an update and in which language it was authored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Language the caller just wrote. Never inferred.
    pub source_language: Language,
    /// Fields to consider; empty means every translatable field
    pub fields: Vec<LogicalField>,
    /// Leave `supported_languages` untouched (completion flags still refresh)
    pub skip_completion_update: bool,
}

impl UpdateRequest {
    pub fn new(source_language: Language) -> Self {
        Self {
            source_language,
            fields: Vec::new(),
            skip_completion_update: false,
        }
    }

    /// Restrict the update to these fields
    pub fn fields(mut self, fields: impl IntoIterator<Item = LogicalField>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    pub fn skip_completion_update(mut self, skip: bool) -> Self {
        self.skip_completion_update = skip;
        self
    }

    fn fields_for(&self, kind: EntityKind) -> Vec<LogicalField> {
        if self.fields.is_empty() {
            return kind.translatable_fields().to_vec();
        }
        kind.translatable_fields()
            .iter()
            .copied()
            .filter(|field| self.fields.contains(field))
            .collect()
    }
}

/// Why no translation was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The acting user turned auto-translation off
    TranslationDisabled,
    /// Every target field already had content
    NoMissingContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    /// Every requested translation was written
    Applied,
    /// Some translations failed and were left empty
    Partial,
    Skipped(SkipReason),
}

/// Result of one update cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub status: UpdateStatus,
    /// Fields written with a translation
    pub translated: usize,
    /// Fields left empty because translation failed
    pub failed: usize,
    /// Languages newly added to `supported_languages`
    pub languages_added: Vec<Language>,
}

impl UpdateOutcome {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            status: UpdateStatus::Skipped(reason),
            translated: 0,
            failed: 0,
            languages_added: Vec::new(),
        }
    }

    fn from_counts(translated: usize, failed: usize) -> Self {
        Self {
            status: if failed == 0 {
                UpdateStatus::Applied
            } else {
                UpdateStatus::Partial
            },
            translated,
            failed,
            languages_added: Vec::new(),
        }
    }
}

/// Summary of a bulk update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    /// Entities in the batch
    pub total: usize,
    /// Fields that needed a translation
    pub requested: usize,
    pub translated: usize,
    pub failed: usize,
    /// Set when translation was skipped for the whole batch
    pub skipped: Option<SkipReason>,
    /// Entities that could not be persisted
    pub errors: Vec<String>,
}

/// One missing field: owning entity (by position), field and source text
type Task = (usize, LogicalField, String);

/// Keeps localized entities translated and their flags consistent
pub struct MultilingualContentManager {
    gateway: Arc<TranslationGateway>,
    store: Arc<dyn EntityStore>,
    users: Arc<dyn UserSettings>,
}

impl MultilingualContentManager {
    pub fn new(
        gateway: Arc<TranslationGateway>,
        store: Arc<dyn EntityStore>,
        users: Arc<dyn UserSettings>,
    ) -> Self {
        Self {
            gateway,
            store,
            users,
        }
    }

    pub fn gateway(&self) -> &TranslationGateway {
        &self.gateway
    }

    /// Run one update cycle on an entity whose `request.source_language`
    /// fields were just written by `user`.
    ///
    /// Translation failures never fail the update; a persistence failure does.
    /// With auto-translation disabled the entity is neither modified nor saved.
    pub async fn handle_update(
        &self,
        entity: &mut LocalizedEntity,
        user: &ActingUser,
        request: &UpdateRequest,
    ) -> Result<UpdateOutcome, ContentError> {
        let source = request.source_language;

        if !self.auto_translate_enabled(user).await {
            info!(
                "Auto-translation disabled for {}, leaving {} '{}' untouched",
                user,
                entity.kind(),
                entity.id()
            );
            return Ok(UpdateOutcome::skipped(SkipReason::TranslationDisabled));
        }

        let mut touched = vec![source];
        let tasks = missing_translations(std::slice::from_ref(&*entity), request);
        let mut outcome = if tasks.is_empty() {
            debug!("{} '{}' has no missing content", entity.kind(), entity.id());
            UpdateOutcome::skipped(SkipReason::NoMissingContent)
        } else {
            touched.extend(tasks.keys().copied());
            let (translated, failed) = self
                .apply_translations(std::slice::from_mut(entity), source, tasks)
                .await?;
            UpdateOutcome::from_counts(translated, failed)
        };

        outcome.languages_added = refresh_flags(entity, &touched, request.skip_completion_update);

        self.persist(entity).await?;

        info!(
            "Updated {} '{}' from {}: {:?}, {} translated, {} failed, supported [{}]",
            entity.kind(),
            entity.id(),
            source,
            outcome.status,
            outcome.translated,
            outcome.failed,
            entity.supported_languages()
        );

        Ok(outcome)
    }

    /// Load an entity by id, update it and return it with the outcome
    pub async fn handle_update_by_id(
        &self,
        id: &str,
        user: &ActingUser,
        request: &UpdateRequest,
    ) -> Result<(LocalizedEntity, UpdateOutcome), ContentError> {
        let mut entity = self
            .store
            .load(id)
            .await?
            .ok_or_else(|| ContentError::NotFound(id.to_string()))?;
        let outcome = self.handle_update(&mut entity, user, request).await?;
        Ok((entity, outcome))
    }

    /// Update many entities authored in the same language.
    ///
    /// Missing fields of all entities are pooled so that each language pair
    /// costs one gateway call for the whole batch. Every entity is saved on
    /// its own; save failures are reported and do not stop the batch.
    /// With auto-translation disabled nothing is modified or saved.
    pub async fn handle_bulk_update(
        &self,
        entities: &mut [LocalizedEntity],
        user: &ActingUser,
        request: &UpdateRequest,
    ) -> BulkReport {
        let source = request.source_language;
        let mut report = BulkReport {
            total: entities.len(),
            ..Default::default()
        };
        if entities.is_empty() {
            return report;
        }

        if !self.auto_translate_enabled(user).await {
            info!(
                "Auto-translation disabled for {}, leaving {} entities untouched",
                user, report.total
            );
            report.skipped = Some(SkipReason::TranslationDisabled);
            return report;
        }

        let mut touched = vec![source];
        let tasks = missing_translations(entities, request);
        report.requested = tasks.values().map(Vec::len).sum();
        if tasks.is_empty() {
            report.skipped = Some(SkipReason::NoMissingContent);
        } else {
            touched.extend(tasks.keys().copied());
            match self.apply_translations(entities, source, tasks).await {
                Ok((translated, failed)) => {
                    report.translated = translated;
                    report.failed = failed;
                }
                Err(e) => report.errors.push(e.to_string()),
            }
        }

        for entity in entities.iter_mut() {
            refresh_flags(entity, &touched, request.skip_completion_update);
            if let Err(e) = self.persist(entity).await {
                report.errors.push(format!("{} '{}': {}", entity.kind(), entity.id(), e));
            }
        }

        info!(
            "Bulk update of {} entities from {}: {} requested, {} translated, {} failed, {} error(s)",
            report.total,
            source,
            report.requested,
            report.translated,
            report.failed,
            report.errors.len()
        );

        report
    }

    /// Translate `fields` of `entity` from `source` into `target` right now.
    ///
    /// This is a user-initiated action: existing target content is
    /// overwritten, the auto-translate setting does not apply and any
    /// failure is returned as an error with nothing written.
    pub async fn translate_now(
        &self,
        entity: &mut LocalizedEntity,
        source: Language,
        target: Language,
        fields: &[LogicalField],
    ) -> Result<UpdateOutcome, ContentError> {
        let request = UpdateRequest::new(source).fields(fields.iter().copied());
        let selected: Vec<(LogicalField, String)> = request
            .fields_for(entity.kind())
            .into_iter()
            .filter(|field| entity.has_content(source, *field))
            .map(|field| (field, entity.field(source, field).to_string()))
            .collect();

        if selected.is_empty() || source == target {
            return Ok(UpdateOutcome::skipped(SkipReason::NoMissingContent));
        }

        let texts: Vec<String> = selected.iter().map(|(_, text)| text.clone()).collect();
        let translations = self.gateway.translate_texts(&texts, source, target).await?;

        for ((field, _), translation) in selected.iter().zip(translations) {
            entity.set_field(target, *field, translation)?;
        }

        let mut outcome = UpdateOutcome::from_counts(selected.len(), 0);
        outcome.languages_added = completion::sync(entity, &[source, target]);
        self.persist(entity).await?;

        info!(
            "Manually translated {} field(s) of {} '{}' {} -> {}",
            selected.len(),
            entity.kind(),
            entity.id(),
            source,
            target
        );

        Ok(outcome)
    }

    /// Remove a language from the supported set and persist.
    /// Returns whether it was present.
    pub async fn remove_supported_language(
        &self,
        entity: &mut LocalizedEntity,
        lang: Language,
    ) -> Result<bool, ContentError> {
        let removed = entity.remove_supported_language(lang)?;
        if removed {
            warn!(
                "Removed {} from supported languages of {} '{}'",
                lang,
                entity.kind(),
                entity.id()
            );
            self.persist(entity).await?;
        }
        Ok(removed)
    }

    async fn auto_translate_enabled(&self, user: &ActingUser) -> bool {
        if matches!(user, ActingUser::Anonymous) {
            return true;
        }
        match self.users.is_auto_translate_enabled(user).await {
            Ok(enabled) => enabled,
            Err(e) => {
                warn!("Could not read auto-translation setting for {}: {}", user, e);
                true
            }
        }
    }

    /// Translate pooled tasks, one gateway call per target language, and
    /// write every non-empty result. Returns (translated, failed).
    async fn apply_translations(
        &self,
        entities: &mut [LocalizedEntity],
        source: Language,
        tasks: BTreeMap<Language, Vec<Task>>,
    ) -> Result<(usize, usize), ContentError> {
        let mut translated = 0;
        let mut failed = 0;

        for (target, items) in tasks {
            let texts: Vec<String> = items.iter().map(|(_, _, text)| text.clone()).collect();
            let results = self.gateway.translate_batch(&texts, source, target).await;

            for ((index, field, _), result) in items.into_iter().zip(results) {
                match result {
                    Some(text) if !is_blank(&text) => {
                        entities[index].set_field(target, field, text)?;
                        translated += 1;
                    }
                    _ => failed += 1,
                }
            }
        }

        Ok((translated, failed))
    }

    async fn persist(&self, entity: &LocalizedEntity) -> Result<(), ContentError> {
        self.store.save(entity).await.map_err(|e| {
            error!("Failed to save {} '{}': {}", entity.kind(), entity.id(), e);
            ContentError::Store(e)
        })
    }
}

/// Target fields that are empty while the source field has content,
/// grouped by target language
fn missing_translations(
    entities: &[LocalizedEntity],
    request: &UpdateRequest,
) -> BTreeMap<Language, Vec<Task>> {
    let source = request.source_language;
    let mut tasks: BTreeMap<Language, Vec<Task>> = BTreeMap::new();

    for (index, entity) in entities.iter().enumerate() {
        for field in request.fields_for(entity.kind()) {
            if !entity.has_content(source, field) {
                continue;
            }
            for target in Language::ALL.into_iter().filter(|lang| *lang != source) {
                if !entity.has_content(target, field) {
                    tasks
                        .entry(target)
                        .or_default()
                        .push((index, field, entity.field(source, field).to_string()));
                }
            }
        }
    }

    tasks
}

/// Recompute flags of the touched languages and, unless skipped, promote
/// complete languages. Returns the newly supported languages.
fn refresh_flags(
    entity: &mut LocalizedEntity,
    touched: &[Language],
    skip_promotion: bool,
) -> Vec<Language> {
    for lang in touched {
        completion::recompute(entity, *lang);
    }
    if skip_promotion {
        debug!(
            "Skipping supported language promotion for {} '{}'",
            entity.kind(),
            entity.id()
        );
        Vec::new()
    } else {
        completion::promote_supported(entity)
    }
}
