/*!
 * Persistence collaborator for localized entities.
 */

use anyhow::Result;
use async_trait::async_trait;

use super::entity::LocalizedEntity;

/// Loads and saves localized entities.
///
/// `save` must write every field, completion flag and the supported set of
/// the entity in a single atomic operation. Retrying failed writes is the
/// store's own concern.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Load an entity by id
    async fn load(&self, id: &str) -> Result<Option<LocalizedEntity>>;

    /// Persist all pending changes of an entity at once
    async fn save(&self, entity: &LocalizedEntity) -> Result<()>;
}
