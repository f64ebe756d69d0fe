/*!
 * End-to-end tests over the SQLite repository
 */

use std::sync::Arc;

use anyhow::Result;
use tempfile::TempDir;

use drillquiz_i18n::content::{
    ActingUser, EntityKind, LocalizedEntity, LocalizedFieldAccessor, LogicalField, MultilingualContentManager,
    SkipReason, UpdateRequest, UpdateStatus,
};
use drillquiz_i18n::database::{DatabaseConnection, Repository, UserProfile};
use drillquiz_i18n::language::{Language, resolve_for_user};
use drillquiz_i18n::providers::mock::MockProvider;

use crate::common::{gateway_with, init_logging, korean_question, korean_study, tagged};

fn manager_over(repo: &Arc<Repository>, provider: &MockProvider) -> MultilingualContentManager {
    init_logging();
    MultilingualContentManager::new(Arc::new(gateway_with(provider, None)), repo.clone(), repo.clone())
}

#[tokio::test]
async fn test_updateCycle_shouldPersistTranslationsAndFlags() -> Result<()> {
    let repo = Arc::new(Repository::new_in_memory()?);
    let provider = MockProvider::working();
    let manager = manager_over(&repo, &provider);
    let mut study = korean_study("study-1");

    manager
        .handle_update(&mut study, &ActingUser::user("alice"), &UpdateRequest::new(Language::Ko))
        .await?;

    let stored = repo.load_entity("study-1").await?.expect("study should be stored");
    assert_eq!(stored, study);
    assert_eq!(stored.field(Language::Es, LogicalField::Goal), tagged("목표", Language::Es));
    assert_eq!(stored.supported_languages().to_csv(), "ko,en,es,zh,ja");

    let summaries = repo.list_entities(Some(EntityKind::Study)).await?;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].complete_languages.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_updateCycle_withProfileDisablingTranslation_shouldNotSave() -> Result<()> {
    let repo = Arc::new(Repository::new_in_memory()?);
    repo.upsert_profile(&UserProfile::new("bob").with_auto_translation(false)).await?;
    let provider = MockProvider::working();
    let manager = manager_over(&repo, &provider);
    let mut study = korean_study("study-2");

    let outcome = manager
        .handle_update(&mut study, &ActingUser::user("bob"), &UpdateRequest::new(Language::Ko))
        .await?;

    assert_eq!(outcome.status, UpdateStatus::Skipped(SkipReason::TranslationDisabled));
    assert!(repo.load_entity("study-2").await?.is_none());
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_updateById_afterSourceEdit_shouldFillNewField() -> Result<()> {
    let repo = Arc::new(Repository::new_in_memory()?);
    let provider = MockProvider::working();
    let manager = manager_over(&repo, &provider);
    let user = ActingUser::Anonymous;

    let mut question = korean_question("q-1");
    manager.handle_update(&mut question, &user, &UpdateRequest::new(Language::Ko)).await?;

    // Author adds an explanation later
    question.set_field(Language::Ko, LogicalField::Explanation, "기본 덧셈")?;
    repo.save_entity(&question).await?;

    let (updated, outcome) = manager
        .handle_update_by_id("q-1", &user, &UpdateRequest::new(Language::Ko))
        .await?;

    assert_eq!(outcome.translated, 4);
    assert_eq!(
        updated.field(Language::Zh, LogicalField::Explanation),
        tagged("기본 덧셈", Language::Zh)
    );
    assert_eq!(repo.load_entity("q-1").await?, Some(updated));
    Ok(())
}

#[tokio::test]
async fn test_resolveAndRead_shouldUseStoredPreference() -> Result<()> {
    let repo = Arc::new(Repository::new_in_memory()?);
    repo.upsert_profile(&UserProfile::new("yuki").with_language("ja")).await?;

    let mut tag = LocalizedEntity::new("tag-1", EntityKind::Tag, Language::En);
    tag.set_field(Language::En, LogicalField::Name, "Arithmetic")?;
    tag.set_field(Language::Ja, LogicalField::Name, "算数")?;
    repo.save_entity(&tag).await?;

    let user = ActingUser::user("yuki");
    let lang = resolve_for_user(repo.as_ref(), &user, None, Some("ko"), Language::En).await;
    let stored = repo.load_entity("tag-1").await?.expect("tag should be stored");
    let accessor = LocalizedFieldAccessor::new(Language::En);

    assert_eq!(lang, Language::Ja);
    assert_eq!(accessor.get_field(&stored, LogicalField::Name, lang), "算数");
    assert_eq!(accessor.get_field(&stored, LogicalField::Name, Language::Ko), "Arithmetic");
    Ok(())
}

#[tokio::test]
async fn test_fileDatabase_shouldSurviveReopen() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("content.db");
    let provider = MockProvider::working();

    {
        let repo = Arc::new(Repository::new(DatabaseConnection::new(&path)?));
        let manager = manager_over(&repo, &provider);
        let mut study = korean_study("study-3");
        manager
            .handle_update(&mut study, &ActingUser::Anonymous, &UpdateRequest::new(Language::Ko))
            .await?;
        manager.remove_supported_language(&mut study, Language::Zh).await?;
    }

    let repo = Repository::new(DatabaseConnection::new(&path)?);
    let study = repo.load_entity("study-3").await?.expect("study should survive reopen");

    assert_eq!(study.supported_languages().to_csv(), "ko,en,es,ja");
    assert!(study.is_complete(Language::Zh));
    assert_eq!(repo.connection().stats()?.entity_count, 1);
    Ok(())
}
