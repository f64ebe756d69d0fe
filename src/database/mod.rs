/*!
 * Database module for persistent storage of localized content.
 *
 * This module provides SQLite-based persistence for:
 * - Localized entities with their per-language field values and flags
 * - User profiles (display language and auto-translation toggle)
 *
 * `Repository` implements both `EntityStore` and `UserSettings`.
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::{EntitySummary, UserProfile};
pub use repository::Repository;
