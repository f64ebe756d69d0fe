/*!
 * Localized field reads with a deterministic fallback chain.
 *
 * Reads never fail: an absent value resolves through the default language
 * and then every other language in canonical order, ending in `""`.
 */

use serde::Serialize;
use std::collections::BTreeMap;

use super::entity::LocalizedEntity;
use super::fields::LogicalField;
use crate::language::{DEFAULT_LANGUAGE, Language};

/// Every translatable field of an entity resolved for one language
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedView {
    pub id: String,
    pub language: Language,
    pub fields: BTreeMap<LogicalField, String>,
    /// Languages holding content in at least one field
    pub available_languages: Vec<Language>,
    pub supported_languages: Vec<Language>,
    pub is_complete: bool,
}

/// Reads localized fields relative to a default language
#[derive(Debug, Clone, Copy)]
pub struct LocalizedFieldAccessor {
    default_language: Language,
}

impl Default for LocalizedFieldAccessor {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl LocalizedFieldAccessor {
    pub fn new(default_language: Language) -> Self {
        Self { default_language }
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    /// Languages tried for a read of `lang`, in order, without duplicates
    pub fn fallback_chain(&self, lang: Language) -> Vec<Language> {
        let mut chain = Vec::with_capacity(Language::ALL.len());
        for candidate in [lang, self.default_language].into_iter().chain(Language::ALL) {
            if !chain.contains(&candidate) {
                chain.push(candidate);
            }
        }
        chain
    }

    /// Read `field` in `lang`, falling back when it is empty
    pub fn get_field(&self, entity: &LocalizedEntity, field: LogicalField, lang: Language) -> String {
        self.fallback_chain(lang)
            .into_iter()
            .map(|candidate| entity.field(candidate, field))
            .find(|value| !value.trim().is_empty())
            .unwrap_or("")
            .to_string()
    }

    /// Read `field` for a raw language code. An unsupported code reads the
    /// default language directly.
    pub fn get_field_by_code(&self, entity: &LocalizedEntity, field: LogicalField, code: &str) -> String {
        let lang = Language::from_code(code).unwrap_or(self.default_language);
        self.get_field(entity, field, lang)
    }

    /// Like `get_field`, but shows a localized placeholder instead of `""`
    pub fn get_field_or_placeholder(
        &self,
        entity: &LocalizedEntity,
        field: LogicalField,
        lang: Language,
    ) -> String {
        let value = self.get_field(entity, field, lang);
        if value.is_empty() {
            field.placeholder(lang).to_string()
        } else {
            value
        }
    }

    /// Resolve every translatable field of `entity` for `lang`
    pub fn localized_view(&self, entity: &LocalizedEntity, lang: Language) -> LocalizedView {
        let fields = entity
            .kind()
            .translatable_fields()
            .iter()
            .map(|field| (*field, self.get_field(entity, *field, lang)))
            .collect();

        LocalizedView {
            id: entity.id().to_string(),
            language: lang,
            fields,
            available_languages: Language::ALL
                .into_iter()
                .filter(|candidate| entity.has_any_content(*candidate))
                .collect(),
            supported_languages: entity.supported_languages().iter().collect(),
            is_complete: entity.is_complete(lang),
        }
    }
}
