/*!
 * Tests for display language resolution
 */

use drillquiz_i18n::content::ActingUser;
use drillquiz_i18n::language::{Language, resolve_for_user, resolve_language};

use crate::common::StaticUserSettings;

#[test]
fn test_resolve_withEveryLevelPresent_shouldPreferRequestParam() {
    let lang = resolve_language(Some("ja"), Some("ko"), Some("es"), Language::En);
    assert_eq!(lang, Language::Ja);
}

#[test]
fn test_resolve_withUnsupportedRequestParam_shouldFallToProfile() {
    let lang = resolve_language(Some("fr"), Some("ko"), Some("es"), Language::En);
    assert_eq!(lang, Language::Ko);
}

#[test]
fn test_resolve_withUnsupportedProfile_shouldUseAcceptLanguage() {
    let lang = resolve_language(None, Some("de"), Some("fr-FR,zh-CN;q=0.8,en;q=0.5"), Language::En);
    assert_eq!(lang, Language::Zh);
}

#[test]
fn test_resolve_withAcceptLanguageQualities_shouldPickHighestSupported() {
    let lang = resolve_language(None, None, Some("en;q=0.3, ja;q=0.9, ko;q=0"), Language::Ko);
    assert_eq!(lang, Language::Ja);
}

#[test]
fn test_resolve_withNothingUsable_shouldReturnDefault() {
    assert_eq!(resolve_language(None, None, None, Language::Es), Language::Es);
    assert_eq!(
        resolve_language(Some(""), Some("xx"), Some("*;q=0.5, ;;;"), Language::Es),
        Language::Es
    );
}

#[tokio::test]
async fn test_resolveForUser_withStoredPreference_shouldUseIt() {
    let users = StaticUserSettings::new().with_language("alice", "ja-JP");

    let lang = resolve_for_user(&users, &ActingUser::user("alice"), None, Some("en"), Language::En).await;

    assert_eq!(lang, Language::Ja);
}

#[tokio::test]
async fn test_resolveForUser_withAnonymous_shouldIgnoreProfiles() {
    let users = StaticUserSettings::new().with_language("alice", "ja");

    let lang = resolve_for_user(&users, &ActingUser::Anonymous, None, Some("es"), Language::En).await;

    assert_eq!(lang, Language::Es);
}

#[tokio::test]
async fn test_resolveForUser_withBrokenSettings_shouldFallThrough() {
    let users = StaticUserSettings::broken();

    let lang = resolve_for_user(&users, &ActingUser::user("alice"), None, Some("ko"), Language::En).await;

    assert_eq!(lang, Language::Ko);
}

#[test]
fn test_allLanguages_shouldRoundTripThroughCodes() {
    for lang in Language::ALL {
        assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        assert!(!lang.english_name().is_empty());
    }
}
