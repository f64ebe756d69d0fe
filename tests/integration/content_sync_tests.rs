/*!
 * Integration tests for the content manager update cycle
 */

use drillquiz_i18n::content::{
    ActingUser, EntityKind, LocalizedEntity, LocalizedFieldAccessor, LogicalField, SkipReason, UpdateRequest,
    UpdateStatus,
};
use drillquiz_i18n::errors::{ContentError, TranslationError};
use drillquiz_i18n::language::Language;
use drillquiz_i18n::providers::mock::MockProvider;

use crate::common::{Harness, MemoryStore, StaticUserSettings, korean_question, korean_study, tagged};

fn hello_provider() -> MockProvider {
    MockProvider::working().with_custom_response(|text, target| match (text, target) {
        ("안녕", Language::En) => Some("Hello".to_string()),
        _ => Some(MockProvider::tag_translation(text, target)),
    })
}

fn korean_request() -> UpdateRequest {
    UpdateRequest::new(Language::Ko)
}

#[tokio::test]
async fn test_handleUpdate_withAutoTranslate_shouldFillEveryLanguage() {
    let harness = Harness::new(hello_provider(), StaticUserSettings::new());
    let mut study = korean_study("study-1");

    let outcome = harness
        .manager
        .handle_update(&mut study, &ActingUser::user("alice"), &korean_request())
        .await
        .unwrap();

    assert_eq!(outcome.status, UpdateStatus::Applied);
    assert_eq!(outcome.translated, 8);
    assert_eq!(study.field(Language::En, LogicalField::Title), "Hello");
    assert_eq!(study.field(Language::Ja, LogicalField::Goal), tagged("목표", Language::Ja));
    assert!(study.is_complete(Language::En));
    assert_eq!(study.supported_languages().to_csv(), "ko,en,es,zh,ja");
    assert_eq!(outcome.languages_added, vec![Language::En, Language::Es, Language::Zh, Language::Ja]);

    // One batch per target language
    assert_eq!(harness.primary.request_count(), 4);
    assert_eq!(harness.store.save_count(), 1);
    assert_eq!(harness.store.get("study-1"), Some(study));
}

#[tokio::test]
async fn test_handleUpdate_withAutoTranslateDisabled_shouldLeaveEntityUntouched() {
    let users = StaticUserSettings::new().with_auto_translate_disabled("bob");
    let harness = Harness::new(hello_provider(), users);
    let mut study = korean_study("study-2");
    let before = study.clone();

    let outcome = harness
        .manager
        .handle_update(&mut study, &ActingUser::user("bob"), &korean_request())
        .await
        .unwrap();

    assert_eq!(outcome.status, UpdateStatus::Skipped(SkipReason::TranslationDisabled));
    assert_eq!(study.field(Language::En, LogicalField::Title), "");
    assert_eq!(study.supported_languages().to_csv(), "ko");
    assert_eq!(study, before);
    assert_eq!(harness.primary.request_count(), 0);
    assert_eq!(harness.store.save_count(), 0);
}

#[tokio::test]
async fn test_handleUpdate_withFailedItem_shouldKeepOthersAndFlagIncomplete() {
    let provider = MockProvider::working().with_custom_response(|text, target| {
        (text != "4").then(|| MockProvider::tag_translation(text, target))
    });
    let harness = Harness::new(provider, StaticUserSettings::new());
    let mut question = korean_question("q-1");

    let outcome = harness
        .manager
        .handle_update(&mut question, &ActingUser::Anonymous, &korean_request())
        .await
        .unwrap();

    assert_eq!(outcome.status, UpdateStatus::Partial);
    assert_eq!(outcome.translated, 8);
    assert_eq!(outcome.failed, 4);
    assert_eq!(question.field(Language::En, LogicalField::Title), tagged("덧셈", Language::En));
    assert_eq!(question.field(Language::En, LogicalField::Content), tagged("2+2는?", Language::En));
    assert_eq!(question.field(Language::En, LogicalField::Answer), "");
    assert!(!question.is_complete(Language::En));
    assert!(question.is_complete(Language::Ko));
    assert_eq!(question.supported_languages().to_csv(), "ko");
    // A partial failure still persists what succeeded
    assert_eq!(harness.store.save_count(), 1);
}

#[tokio::test]
async fn test_handleUpdate_calledTwice_shouldNotTranslateAgain() {
    let harness = Harness::new(MockProvider::working(), StaticUserSettings::new());
    let mut study = korean_study("study-3");
    let user = ActingUser::user("alice");

    harness.manager.handle_update(&mut study, &user, &korean_request()).await.unwrap();
    let after_first = study.clone();
    let calls = harness.primary.request_count();

    let outcome = harness.manager.handle_update(&mut study, &user, &korean_request()).await.unwrap();

    assert_eq!(outcome.status, UpdateStatus::Skipped(SkipReason::NoMissingContent));
    assert!(outcome.languages_added.is_empty());
    assert_eq!(study, after_first);
    assert_eq!(harness.primary.request_count(), calls);
}

#[tokio::test]
async fn test_handleUpdate_shouldNotOverwriteExistingTranslations() {
    let harness = Harness::new(MockProvider::working(), StaticUserSettings::new());
    let mut study = korean_study("study-4");
    study.set_field(Language::En, LogicalField::Title, "Curated title").unwrap();

    harness
        .manager
        .handle_update(&mut study, &ActingUser::Anonymous, &korean_request())
        .await
        .unwrap();

    assert_eq!(study.field(Language::En, LogicalField::Title), "Curated title");
    assert_eq!(study.field(Language::En, LogicalField::Goal), tagged("목표", Language::En));
    let en_call = harness
        .primary
        .calls()
        .into_iter()
        .find(|call| call.target_language == Language::En)
        .unwrap();
    assert_eq!(en_call.texts, vec!["목표".to_string()]);
}

#[tokio::test]
async fn test_handleUpdate_withSkipCompletionUpdate_shouldNotPromote() {
    let harness = Harness::new(MockProvider::working(), StaticUserSettings::new());
    let mut study = korean_study("study-5");
    let request = korean_request().skip_completion_update(true);

    let outcome = harness
        .manager
        .handle_update(&mut study, &ActingUser::Anonymous, &request)
        .await
        .unwrap();

    assert!(outcome.languages_added.is_empty());
    assert!(study.is_complete(Language::Es));
    assert_eq!(study.supported_languages().to_csv(), "ko");

    // The next regular update promotes the already complete languages
    let outcome = harness
        .manager
        .handle_update(&mut study, &ActingUser::Anonymous, &korean_request())
        .await
        .unwrap();
    assert_eq!(outcome.languages_added.len(), 4);
}

#[tokio::test]
async fn test_handleUpdate_withFieldSubset_shouldOnlyTranslateThoseFields() {
    let harness = Harness::new(MockProvider::working(), StaticUserSettings::new());
    let mut study = korean_study("study-6");
    let request = korean_request().fields([LogicalField::Title, LogicalField::Answer]);

    harness
        .manager
        .handle_update(&mut study, &ActingUser::Anonymous, &request)
        .await
        .unwrap();

    assert_eq!(study.field(Language::Zh, LogicalField::Title), tagged("안녕", Language::Zh));
    assert_eq!(study.field(Language::Zh, LogicalField::Goal), "");
    assert!(!study.is_complete(Language::Zh));
}

#[tokio::test]
async fn test_handleUpdate_withEmptySource_shouldOnlyRecomputeFlags() {
    let harness = Harness::new(MockProvider::working(), StaticUserSettings::new());
    let mut tag = LocalizedEntity::new("tag-1", EntityKind::Tag, Language::En);

    let outcome = harness
        .manager
        .handle_update(&mut tag, &ActingUser::Anonymous, &UpdateRequest::new(Language::En))
        .await
        .unwrap();

    assert_eq!(outcome.status, UpdateStatus::Skipped(SkipReason::NoMissingContent));
    assert!(!tag.is_complete(Language::En));
    assert_eq!(harness.primary.request_count(), 0);
    assert_eq!(harness.store.save_count(), 1);
}

#[tokio::test]
async fn test_handleUpdate_withProvidersDown_shouldStillSaveSource() {
    let harness = Harness::new(MockProvider::failing(), StaticUserSettings::new());
    let mut study = korean_study("study-7");

    let outcome = harness
        .manager
        .handle_update(&mut study, &ActingUser::Anonymous, &korean_request())
        .await
        .unwrap();

    assert_eq!(outcome.status, UpdateStatus::Partial);
    assert_eq!(outcome.translated, 0);
    assert!(study.is_complete(Language::Ko));
    assert!(!study.has_any_content(Language::En));
    assert_eq!(harness.store.get("study-7"), Some(study));

    // Both providers are now in their outage window: the first target
    // language tripped them, the remaining targets were never sent
    assert_eq!(harness.primary.request_count(), 1);
    assert_eq!(harness.fallback.request_count(), 1);
}

#[tokio::test]
async fn test_handleUpdate_withBrokenUserSettings_shouldTranslate() {
    let harness = Harness::new(MockProvider::working(), StaticUserSettings::broken());
    let mut study = korean_study("study-8");

    let outcome = harness
        .manager
        .handle_update(&mut study, &ActingUser::user("carol"), &korean_request())
        .await
        .unwrap();

    assert_eq!(outcome.status, UpdateStatus::Applied);
    assert!(study.is_complete(Language::En));
}

#[tokio::test]
async fn test_handleUpdate_withFailingStore_shouldReturnStoreError() {
    let harness = Harness::with_store(MockProvider::working(), StaticUserSettings::new(), MemoryStore::failing());
    let mut study = korean_study("study-9");

    let result = harness
        .manager
        .handle_update(&mut study, &ActingUser::Anonymous, &korean_request())
        .await;

    assert!(matches!(result, Err(ContentError::Store(_))));
}

#[tokio::test]
async fn test_handleUpdateById_withUnknownId_shouldReturnNotFound() {
    let harness = Harness::new(MockProvider::working(), StaticUserSettings::new());

    let result = harness
        .manager
        .handle_update_by_id("missing", &ActingUser::Anonymous, &korean_request())
        .await;

    assert!(matches!(result, Err(ContentError::NotFound(id)) if id == "missing"));
}

#[tokio::test]
async fn test_handleUpdateById_shouldLoadUpdateAndSave() {
    let harness = Harness::new(MockProvider::working(), StaticUserSettings::new());
    harness.store.insert(korean_study("study-10"));

    let (study, outcome) = harness
        .manager
        .handle_update_by_id("study-10", &ActingUser::Anonymous, &korean_request())
        .await
        .unwrap();

    assert_eq!(outcome.status, UpdateStatus::Applied);
    assert_eq!(harness.store.get("study-10"), Some(study));
}

#[tokio::test]
async fn test_handleUpdate_thenAccessor_shouldReadTranslatedField() {
    let harness = Harness::new(hello_provider(), StaticUserSettings::new());
    let mut study = korean_study("study-11");
    harness
        .manager
        .handle_update(&mut study, &ActingUser::Anonymous, &korean_request())
        .await
        .unwrap();

    let accessor = LocalizedFieldAccessor::new(Language::En);

    assert_eq!(accessor.get_field(&study, LogicalField::Title, Language::En), "Hello");
    assert_eq!(accessor.get_field(&study, LogicalField::Title, Language::Ko), "안녕");
}

#[tokio::test]
async fn test_handleBulkUpdate_shouldPoolTranslationsPerLanguage() {
    let harness = Harness::new(MockProvider::working(), StaticUserSettings::new());
    let mut entities = vec![korean_study("s-1"), korean_study("s-2"), korean_question("q-2")];

    let report = harness
        .manager
        .handle_bulk_update(&mut entities, &ActingUser::Anonymous, &korean_request())
        .await;

    assert_eq!(report.total, 3);
    assert_eq!(report.requested, 4 * 7);
    assert_eq!(report.translated, 28);
    assert_eq!(report.failed, 0);
    assert!(report.errors.is_empty());
    assert_eq!(harness.primary.request_count(), 4);
    assert_eq!(harness.store.save_count(), 3);
    assert!(entities.iter().all(|entity| entity.is_complete(Language::Ja)));
}

#[tokio::test]
async fn test_handleBulkUpdate_withAutoTranslateDisabled_shouldSkipAll() {
    let users = StaticUserSettings::new().with_auto_translate_disabled("bob");
    let harness = Harness::new(MockProvider::working(), users);
    let mut entities = vec![korean_study("s-3"), korean_study("s-4")];

    let report = harness
        .manager
        .handle_bulk_update(&mut entities, &ActingUser::user("bob"), &korean_request())
        .await;

    assert_eq!(report.skipped, Some(SkipReason::TranslationDisabled));
    assert_eq!(harness.store.save_count(), 0);
    assert!(entities.iter().all(|entity| !entity.has_any_content(Language::En)));
}

#[tokio::test]
async fn test_handleBulkUpdate_withFailingStore_shouldReportEachEntity() {
    let harness = Harness::with_store(MockProvider::working(), StaticUserSettings::new(), MemoryStore::failing());
    let mut entities = vec![korean_study("s-5"), korean_study("s-6")];

    let report = harness
        .manager
        .handle_bulk_update(&mut entities, &ActingUser::Anonymous, &korean_request())
        .await;

    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].contains("s-5"));
    assert_eq!(report.translated, 16);
}

#[tokio::test]
async fn test_translateNow_shouldOverwriteTargetFields() {
    let harness = Harness::new(MockProvider::working(), StaticUserSettings::new());
    let mut study = korean_study("study-12");
    study.set_field(Language::En, LogicalField::Title, "Stale").unwrap();

    let outcome = harness
        .manager
        .translate_now(&mut study, Language::Ko, Language::En, &[])
        .await
        .unwrap();

    assert_eq!(outcome.translated, 2);
    assert_eq!(study.field(Language::En, LogicalField::Title), tagged("안녕", Language::En));
    assert!(study.supported_languages().contains(Language::En));
    assert!(!study.has_any_content(Language::Es));
    assert_eq!(harness.store.save_count(), 1);
}

#[tokio::test]
async fn test_translateNow_withDisabledUser_shouldStillTranslate() {
    let users = StaticUserSettings::new().with_auto_translate_disabled("bob");
    let harness = Harness::new(MockProvider::working(), users);
    let mut study = korean_study("study-13");

    let outcome = harness
        .manager
        .translate_now(&mut study, Language::Ko, Language::Ja, &[LogicalField::Goal])
        .await
        .unwrap();

    assert_eq!(outcome.status, UpdateStatus::Applied);
    assert_eq!(study.field(Language::Ja, LogicalField::Goal), tagged("목표", Language::Ja));
    assert_eq!(study.field(Language::Ja, LogicalField::Title), "");
}

#[tokio::test]
async fn test_translateNow_withFailure_shouldWriteNothing() {
    let harness = Harness::new(MockProvider::failing(), StaticUserSettings::new());
    let mut study = korean_study("study-14");
    let before = study.clone();

    let result = harness
        .manager
        .translate_now(&mut study, Language::Ko, Language::En, &[])
        .await;

    assert!(matches!(result, Err(ContentError::Translation(TranslationError::Failed { .. }))));
    assert_eq!(study, before);
    assert_eq!(harness.store.save_count(), 0);
}

#[tokio::test]
async fn test_removeSupportedLanguage_shouldPersistOnlyWhenRemoved() {
    let harness = Harness::new(MockProvider::working(), StaticUserSettings::new());
    let mut study = korean_study("study-15");
    harness
        .manager
        .handle_update(&mut study, &ActingUser::Anonymous, &korean_request())
        .await
        .unwrap();

    assert!(harness.manager.remove_supported_language(&mut study, Language::Zh).await.unwrap());
    assert!(!harness.manager.remove_supported_language(&mut study, Language::Zh).await.unwrap());
    assert_eq!(harness.store.save_count(), 2);
    assert_eq!(harness.store.get("study-15").unwrap().supported_languages().to_csv(), "ko,en,es,ja");

    let result = harness.manager.remove_supported_language(&mut study, Language::Ko).await;
    assert!(matches!(result, Err(ContentError::CreatedLanguageRemoval(Language::Ko))));
}
