/*!
 * Localized content: entities, field reads, completion tracking and the
 * update orchestration that keeps them consistent.
 *
 * - `fields`: Logical fields and entity kinds
 * - `entity`: The localized entity and its supported-language set
 * - `accessor`: Reads with a deterministic language fallback
 * - `completion`: Per-language completion flags
 * - `manager`: Translation-driven updates
 * - `store`, `users`: Collaborator traits for persistence and user settings
 */

pub mod accessor;
pub mod completion;
pub mod entity;
pub mod fields;
pub mod manager;
pub mod store;
pub mod users;

pub use accessor::{LocalizedFieldAccessor, LocalizedView};
pub use entity::{LocalizedEntity, SupportedLanguages};
pub use fields::{EntityKind, LogicalField};
pub use manager::{
    BulkReport, MultilingualContentManager, SkipReason, UpdateOutcome, UpdateRequest, UpdateStatus,
};
pub use store::EntityStore;
pub use users::{ActingUser, UserSettings};
