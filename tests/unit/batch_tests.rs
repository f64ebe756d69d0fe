/*!
 * Tests for batch response parsing
 */

use drillquiz_i18n::errors::ProviderError;
use drillquiz_i18n::translation::batch::parse_translations;

#[test]
fn test_parse_withPlainArray_shouldKeepOrder() {
    let items = parse_translations(r#"["Hello", "World"]"#, 2).unwrap();
    assert_eq!(items, vec![Some("Hello".to_string()), Some("World".to_string())]);
}

#[test]
fn test_parse_withCodeFence_shouldStripFence() {
    let raw = "```json\n[\"Hola\", \"Mundo\"]\n```";
    let items = parse_translations(raw, 2).unwrap();
    assert_eq!(items[1].as_deref(), Some("Mundo"));
}

#[test]
fn test_parse_withTranslationsObject_shouldUnwrap() {
    let items = parse_translations(r#"{"translations": ["こんにちは"]}"#, 1).unwrap();
    assert_eq!(items, vec![Some("こんにちは".to_string())]);
}

#[test]
fn test_parse_withSurroundingProse_shouldFindArray() {
    let raw = "Here you go:\n[\"你好\", \"世界\"]\nLet me know if you need more.";
    let items = parse_translations(raw, 2).unwrap();
    assert_eq!(items[0].as_deref(), Some("你好"));
}

#[test]
fn test_parse_withNullBlankOrNonString_shouldYieldNone() {
    let items = parse_translations(r#"["ok", null, "  ", 42]"#, 4).unwrap();
    assert_eq!(items, vec![Some("ok".to_string()), None, None, None]);
}

#[test]
fn test_parse_withEscapedNewlines_shouldPreserveFormatting() {
    let items = parse_translations(r#"["line one\nline two"]"#, 1).unwrap();
    assert_eq!(items[0].as_deref(), Some("line one\nline two"));
}

#[test]
fn test_parse_withLengthMismatch_shouldFail() {
    let result = parse_translations(r#"["only one"]"#, 2);
    assert!(matches!(result, Err(ProviderError::MalformedResponse(_))));
}

#[test]
fn test_parse_withoutArray_shouldFail() {
    assert!(matches!(
        parse_translations("I cannot translate that.", 1),
        Err(ProviderError::MalformedResponse(_))
    ));
    assert!(parse_translations("", 1).is_err());
}
