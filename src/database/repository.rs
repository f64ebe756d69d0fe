/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details, and implements the content store and
 * user settings collaborators on top of SQLite.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};

use super::connection::DatabaseConnection;
use super::models::{EntityRecord, EntitySummary, FieldRecord, UserProfile};
use crate::content::{ActingUser, EntityKind, EntityStore, LocalizedEntity, UserSettings};
use crate::language::Language;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Fresh identifier for a new entity
    pub fn new_entity_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    // =========================================================================
    // Entity Operations
    // =========================================================================

    /// Load an entity with all its field values
    pub async fn load_entity(&self, entity_id: &str) -> Result<Option<LocalizedEntity>> {
        let entity_id = entity_id.to_string();

        self.db
            .execute_async(move |conn| {
                let Some(record) = Self::get_entity_record_sync(conn, &entity_id)? else {
                    return Ok(None);
                };
                let fields = Self::get_fields_sync(conn, &entity_id)?;
                record.into_entity(fields).map(Some)
            })
            .await
    }

    /// Insert or replace an entity and all its field values atomically
    pub async fn save_entity(&self, entity: &LocalizedEntity) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let record = EntityRecord::from_entity(entity, &now);
        let fields: Vec<FieldRecord> = entity
            .values()
            .map(|(lang, field, value)| FieldRecord {
                entity_id: entity.id().to_string(),
                language: lang.code().to_string(),
                field: field.as_str().to_string(),
                value: value.to_string(),
            })
            .collect();

        debug!(
            "Saving {} '{}' with {} field value(s)",
            record.kind,
            record.id,
            fields.len()
        );

        self.db
            .transaction_async(move |tx| {
                let flags: Vec<bool> = Language::ALL.iter().map(|lang| record.is_complete(*lang)).collect();

                tx.execute(
                    r#"
                    INSERT INTO entities (
                        id, kind, created_language, supported_languages,
                        is_ko_complete, is_en_complete, is_es_complete, is_zh_complete, is_ja_complete,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    ON CONFLICT(id) DO UPDATE SET
                        kind = excluded.kind,
                        created_language = excluded.created_language,
                        supported_languages = excluded.supported_languages,
                        is_ko_complete = excluded.is_ko_complete,
                        is_en_complete = excluded.is_en_complete,
                        is_es_complete = excluded.is_es_complete,
                        is_zh_complete = excluded.is_zh_complete,
                        is_ja_complete = excluded.is_ja_complete,
                        updated_at = excluded.updated_at
                    "#,
                    params![
                        record.id,
                        record.kind,
                        record.created_language,
                        record.supported_languages,
                        flags[0],
                        flags[1],
                        flags[2],
                        flags[3],
                        flags[4],
                        record.created_at,
                        record.updated_at,
                    ],
                )?;

                tx.execute("DELETE FROM entity_fields WHERE entity_id = ?1", [&record.id])?;

                let mut stmt = tx.prepare(
                    "INSERT INTO entity_fields (entity_id, language, field, value) VALUES (?1, ?2, ?3, ?4)",
                )?;
                for field in &fields {
                    stmt.execute(params![field.entity_id, field.language, field.field, field.value])?;
                }

                Ok(())
            })
            .await
    }

    /// List stored entities, optionally of one kind, most recently updated first
    pub async fn list_entities(&self, kind: Option<EntityKind>) -> Result<Vec<EntitySummary>> {
        let kind = kind.map(|k| k.as_str().to_string());

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, kind, created_language, supported_languages,
                           is_ko_complete, is_en_complete, is_es_complete, is_zh_complete, is_ja_complete,
                           created_at, updated_at
                    FROM entities
                    WHERE ?1 IS NULL OR kind = ?1
                    ORDER BY updated_at DESC
                    "#,
                )?;

                let records = stmt
                    .query_map([kind], Self::parse_entity_row)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(records.into_iter().map(EntitySummary::from).collect())
            })
            .await
    }

    /// Delete an entity and its field values. Returns whether it existed.
    pub async fn delete_entity(&self, entity_id: &str) -> Result<bool> {
        let entity_id = entity_id.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute("DELETE FROM entities WHERE id = ?1", [&entity_id])?;
                Ok(deleted > 0)
            })
            .await
    }

    fn get_entity_record_sync(conn: &Connection, entity_id: &str) -> Result<Option<EntityRecord>> {
        let result = conn
            .query_row(
                r#"
                SELECT id, kind, created_language, supported_languages,
                       is_ko_complete, is_en_complete, is_es_complete, is_zh_complete, is_ja_complete,
                       created_at, updated_at
                FROM entities WHERE id = ?1
                "#,
                [entity_id],
                Self::parse_entity_row,
            )
            .optional()?;

        Ok(result)
    }

    fn get_fields_sync(conn: &Connection, entity_id: &str) -> Result<Vec<FieldRecord>> {
        let mut stmt = conn.prepare(
            "SELECT entity_id, language, field, value FROM entity_fields WHERE entity_id = ?1",
        )?;

        let fields = stmt
            .query_map([entity_id], |row| {
                Ok(FieldRecord {
                    entity_id: row.get(0)?,
                    language: row.get(1)?,
                    field: row.get(2)?,
                    value: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(fields)
    }

    fn parse_entity_row(row: &rusqlite::Row) -> rusqlite::Result<EntityRecord> {
        let mut complete_languages = Vec::new();
        for (offset, lang) in Language::ALL.iter().enumerate() {
            if row.get::<_, bool>(4 + offset)? {
                complete_languages.push(lang.code().to_string());
            }
        }

        Ok(EntityRecord {
            id: row.get(0)?,
            kind: row.get(1)?,
            created_language: row.get(2)?,
            supported_languages: row.get(3)?,
            complete_languages,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    // =========================================================================
    // User Profile Operations
    // =========================================================================

    /// Get a user's profile
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let user_id = user_id.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        "SELECT user_id, language, auto_translation_enabled, updated_at FROM user_profiles WHERE user_id = ?1",
                        [&user_id],
                        |row| {
                            Ok(UserProfile {
                                user_id: row.get(0)?,
                                language: row.get(1)?,
                                auto_translation_enabled: row.get(2)?,
                                updated_at: row.get(3)?,
                            })
                        },
                    )
                    .optional()?;

                Ok(result)
            })
            .await
    }

    /// Insert or replace a user's profile
    pub async fn upsert_profile(&self, profile: &UserProfile) -> Result<()> {
        let profile = profile.clone();
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO user_profiles (user_id, language, auto_translation_enabled, updated_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(user_id) DO UPDATE SET
                        language = excluded.language,
                        auto_translation_enabled = excluded.auto_translation_enabled,
                        updated_at = excluded.updated_at
                    "#,
                    params![profile.user_id, profile.language, profile.auto_translation_enabled, now],
                )?;
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl EntityStore for Repository {
    async fn load(&self, id: &str) -> Result<Option<LocalizedEntity>> {
        self.load_entity(id).await
    }

    async fn save(&self, entity: &LocalizedEntity) -> Result<()> {
        self.save_entity(entity).await
    }
}

#[async_trait]
impl UserSettings for Repository {
    async fn language_preference(&self, user: &ActingUser) -> Result<Option<String>> {
        let Some(user_id) = user.id() else {
            return Ok(None);
        };
        Ok(self.get_profile(user_id).await?.and_then(|profile| profile.language))
    }

    async fn is_auto_translate_enabled(&self, user: &ActingUser) -> Result<bool> {
        let Some(user_id) = user.id() else {
            return Ok(true);
        };
        Ok(self
            .get_profile(user_id)
            .await?
            .is_none_or(|profile| profile.auto_translation_enabled))
    }
}
