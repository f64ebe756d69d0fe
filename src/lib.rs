/*!
 * # drillquiz-i18n - Multilingual content engine for DrillQuiz
 *
 * A Rust library that keeps quiz and study content consistent across the
 * five DrillQuiz languages (Korean, English, Spanish, Chinese, Japanese).
 *
 * ## Features
 *
 * - Display language resolution (request, profile, `Accept-Language`, default)
 * - Localized field reads with a deterministic fallback chain
 * - Per-language completion flags and the derived supported-language set
 * - Machine translation of missing content through LLM providers:
 *   - OpenAI API (primary by default)
 *   - Gemini API (fallback by default)
 *   - Anthropic API
 * - Translation cache and a provider outage circuit breaker
 * - SQLite persistence for entities and user profiles
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `language`: Supported languages and display language resolution
 * - `content`: Localized entities and their update orchestration:
 *   - `content::accessor`: Field reads with fallback
 *   - `content::completion`: Completion flags
 *   - `content::manager`: Translation-driven updates
 * - `translation`: Translation gateway, cache, batching and segmentation
 * - `providers`: Client implementations for the LLM providers
 * - `database`: SQLite store for entities and user profiles
 * - `app_config`: Configuration management
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod content;
pub mod database;
pub mod errors;
pub mod language;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use content::{
    ActingUser, LocalizedEntity, LocalizedFieldAccessor, LogicalField, EntityKind,
    MultilingualContentManager, UpdateOutcome, UpdateRequest,
};
pub use database::Repository;
pub use errors::{AppError, ContentError, ProviderError, TranslationError};
pub use language::{Language, resolve_language};
pub use translation::{TranslationCache, TranslationGateway};
