/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to database tables. Conversion into the
 * domain types lives here so the repository stays mostly SQL.
 */

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::content::{EntityKind, LocalizedEntity, LogicalField, SupportedLanguages};
use crate::language::Language;

/// Row of the `entities` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub kind: String,
    pub created_language: String,
    /// Comma-separated language codes
    pub supported_languages: String,
    /// Languages whose `is_<lang>_complete` column is set
    pub complete_languages: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl EntityRecord {
    /// Build the row for an entity, stamped with `now`
    pub fn from_entity(entity: &LocalizedEntity, now: &str) -> Self {
        Self {
            id: entity.id().to_string(),
            kind: entity.kind().to_string(),
            created_language: entity.created_language().code().to_string(),
            supported_languages: entity.supported_languages().to_csv(),
            complete_languages: Language::ALL
                .iter()
                .filter(|lang| entity.is_complete(**lang))
                .map(|lang| lang.code().to_string())
                .collect(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Stored completion flag for a language
    pub fn is_complete(&self, lang: Language) -> bool {
        self.complete_languages.iter().any(|code| code == lang.code())
    }

    /// Rebuild the domain entity from this row and its field rows
    pub fn into_entity(self, fields: Vec<FieldRecord>) -> Result<LocalizedEntity> {
        let kind: EntityKind = self
            .kind
            .parse()
            .with_context(|| format!("Invalid kind for entity {}", self.id))?;
        let created_language: Language = self
            .created_language
            .parse()
            .with_context(|| format!("Invalid created language for entity {}", self.id))?;

        let values = fields.into_iter().filter_map(|record| record.into_value());

        Ok(LocalizedEntity::restore(
            self.id,
            kind,
            created_language,
            values,
            SupportedLanguages::parse(&self.supported_languages),
        ))
    }
}

/// Row of the `entity_fields` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub entity_id: String,
    pub language: String,
    pub field: String,
    pub value: String,
}

impl FieldRecord {
    /// Typed (language, field, value), or `None` for rows this build does not know
    pub fn into_value(self) -> Option<(Language, LogicalField, String)> {
        let lang = Language::from_code(&self.language)?;
        let field = self.field.parse::<LogicalField>().ok()?;
        Some((lang, field, self.value))
    }
}

/// Row of the `user_profiles` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    /// Preferred display language code, stored as given
    pub language: Option<String>,
    pub auto_translation_enabled: bool,
    pub updated_at: String,
}

impl UserProfile {
    /// Profile with translation enabled and no language preference
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            language: None,
            auto_translation_enabled: true,
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_auto_translation(mut self, enabled: bool) -> Self {
        self.auto_translation_enabled = enabled;
        self
    }
}

/// Listing row with the entity's state at a glance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    pub id: String,
    pub kind: String,
    pub created_language: String,
    pub supported_languages: String,
    pub complete_languages: Vec<String>,
    pub updated_at: String,
}

impl From<EntityRecord> for EntitySummary {
    fn from(record: EntityRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind,
            created_language: record.created_language,
            supported_languages: record.supported_languages,
            complete_languages: record.complete_languages,
            updated_at: record.updated_at,
        }
    }
}
