/*!
 * Localized entities.
 *
 * A `LocalizedEntity` holds one value per (language, logical field), a
 * completion flag per language and the derived `supported_languages` set.
 * Fields are private so that every write goes through `set_field`, which
 * refreshes the completion flag of the written language in the same call.
 */

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::completion;
use super::fields::{EntityKind, LogicalField};
use crate::errors::ContentError;
use crate::language::Language;

/// Languages whose content is considered ready, rendered canonically as a
/// comma-joined list (`"ko,en"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedLanguages(BTreeSet<Language>);

impl SupportedLanguages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored comma-joined list. Unknown codes, blanks and
    /// duplicates are ignored.
    pub fn parse(csv: &str) -> Self {
        Self(csv.split(',').filter_map(Language::from_code).collect())
    }

    pub fn contains(&self, lang: Language) -> bool {
        self.0.contains(&lang)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in canonical order
    pub fn iter(&self) -> impl Iterator<Item = Language> + '_ {
        self.0.iter().copied()
    }

    pub fn to_csv(&self) -> String {
        self.iter().map(|lang| lang.code()).collect::<Vec<_>>().join(",")
    }

    pub(crate) fn insert(&mut self, lang: Language) -> bool {
        self.0.insert(lang)
    }

    pub(crate) fn remove(&mut self, lang: Language) -> bool {
        self.0.remove(&lang)
    }
}

impl fmt::Display for SupportedLanguages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_csv())
    }
}

impl FromIterator<Language> for SupportedLanguages {
    fn from_iter<I: IntoIterator<Item = Language>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Treat whitespace-only content as absent
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// A piece of content (study, exam, question, ...) in every supported language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedEntity {
    id: String,
    kind: EntityKind,
    created_language: Language,
    fields: BTreeMap<Language, BTreeMap<LogicalField, String>>,
    completion: BTreeMap<Language, bool>,
    supported_languages: SupportedLanguages,
}

impl LocalizedEntity {
    /// Create an empty entity authored in `created_language`
    pub fn new(id: impl Into<String>, kind: EntityKind, created_language: Language) -> Self {
        let mut supported_languages = SupportedLanguages::new();
        supported_languages.insert(created_language);

        Self {
            id: id.into(),
            kind,
            created_language,
            fields: BTreeMap::new(),
            completion: Language::ALL.iter().map(|lang| (*lang, false)).collect(),
            supported_languages,
        }
    }

    /// Rebuild an entity from stored parts.
    ///
    /// Completion flags are derived from the fields rather than trusted, and
    /// the created language is put back into the supported set if a stored
    /// row lost it.
    pub fn restore(
        id: impl Into<String>,
        kind: EntityKind,
        created_language: Language,
        values: impl IntoIterator<Item = (Language, LogicalField, String)>,
        mut supported_languages: SupportedLanguages,
    ) -> Self {
        supported_languages.insert(created_language);

        let mut entity = Self {
            id: id.into(),
            kind,
            created_language,
            fields: BTreeMap::new(),
            completion: BTreeMap::new(),
            supported_languages,
        };

        for (lang, field, value) in values {
            if kind.has_field(field) && !is_blank(&value) {
                entity.fields.entry(lang).or_default().insert(field, value);
            }
        }

        for lang in Language::ALL {
            completion::recompute(&mut entity, lang);
        }

        entity
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn created_language(&self) -> Language {
        self.created_language
    }

    pub fn supported_languages(&self) -> &SupportedLanguages {
        &self.supported_languages
    }

    /// Stored completion flag for a language
    pub fn is_complete(&self, lang: Language) -> bool {
        self.completion.get(&lang).copied().unwrap_or(false)
    }

    /// Raw value of one field in one language, `""` when unset.
    /// No fallback is applied; see `LocalizedFieldAccessor` for reads.
    pub fn field(&self, lang: Language, field: LogicalField) -> &str {
        self.fields
            .get(&lang)
            .and_then(|values| values.get(&field))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn has_content(&self, lang: Language, field: LogicalField) -> bool {
        !is_blank(self.field(lang, field))
    }

    /// Whether any field of `lang` has content
    pub fn has_any_content(&self, lang: Language) -> bool {
        self.fields
            .get(&lang)
            .is_some_and(|values| values.values().any(|value| !is_blank(value)))
    }

    /// All non-empty values in canonical language order
    pub fn values(&self) -> impl Iterator<Item = (Language, LogicalField, &str)> + '_ {
        self.fields.iter().flat_map(|(lang, values)| {
            values
                .iter()
                .map(move |(field, value)| (*lang, *field, value.as_str()))
        })
    }

    /// Write one field and refresh that language's completion flag.
    ///
    /// Writing blank text clears the field.
    pub fn set_field(
        &mut self,
        lang: Language,
        field: LogicalField,
        value: impl Into<String>,
    ) -> Result<(), ContentError> {
        if !self.kind.has_field(field) {
            return Err(ContentError::UnsupportedField {
                kind: self.kind,
                field,
            });
        }

        let value = value.into();
        if !is_blank(&value) {
            self.fields.entry(lang).or_default().insert(field, value);
        } else if let Some(values) = self.fields.get_mut(&lang) {
            values.remove(&field);
            if values.is_empty() {
                self.fields.remove(&lang);
            }
        }

        completion::recompute(self, lang);
        Ok(())
    }

    /// Remove a language from the supported set.
    ///
    /// This is an explicit administrative action; nothing in the automatic
    /// update path ever removes a language. The created language can never
    /// be removed. Returns whether the language was present.
    pub fn remove_supported_language(&mut self, lang: Language) -> Result<bool, ContentError> {
        if lang == self.created_language {
            return Err(ContentError::CreatedLanguageRemoval(lang));
        }
        Ok(self.supported_languages.remove(lang))
    }

    pub(crate) fn set_completion_flag(&mut self, lang: Language, complete: bool) {
        self.completion.insert(lang, complete);
    }

    pub(crate) fn add_supported_language(&mut self, lang: Language) -> bool {
        self.supported_languages.insert(lang)
    }
}
