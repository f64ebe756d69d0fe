/*!
 * Machine translation of localized content.
 *
 * This module contains everything between a list of source texts and their
 * translations. It is split into several submodules:
 *
 * - `gateway`: Provider chain with fallback, outage handling and batching
 * - `cache`: Translation memoization and provider outage markers
 * - `batch`: Prompt construction and JSON response parsing
 * - `segments`: Multiple-choice and long-text segmentation
 */

// Re-export main types for easier usage
pub use self::cache::{CacheStats, TranslationCache};
pub use self::gateway::{GatewayOptions, GatewayStatus, ProviderStatus, TranslationGateway};
pub use self::segments::{SegmentedText, is_choice_format};

// Submodules
pub mod batch;
pub mod cache;
pub mod gateway;
pub mod segments;
