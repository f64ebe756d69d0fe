/*!
 * Error types for the drillquiz-i18n library.
 *
 * Provider failures never escape the translation gateway's batch path; they
 * are turned into per-item misses and outage markers there. The remaining
 * types surface from the manual translation path, the content manager and
 * the CLI.
 */

use thiserror::Error;

use crate::content::fields::{EntityKind, LogicalField};
use crate::language::Language;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or exhausted quota
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider did not answer within the configured window
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The provider answered, but not with the expected JSON array
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and body to the matching variant
    pub fn from_status(status_code: u16, body: &str) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(body.to_string()),
            429 => Self::RateLimitExceeded(body.to_string()),
            _ if body.contains("insufficient_quota") => Self::RateLimitExceeded(body.to_string()),
            _ => Self::ApiError {
                status_code,
                message: body.to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::RequestFailed(format!("timed out: {}", error))
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Every configured provider is inside its outage window
    #[error("All translation providers are currently unavailable")]
    AllProvidersUnavailable,

    /// Some items of a strict request came back without a translation
    #[error("Translation {source_language} -> {target_language} failed for {failed} of {total} text(s)")]
    Failed {
        source_language: Language,
        target_language: Language,
        failed: usize,
        total: usize,
    },
}

/// Errors raised while reading, updating or persisting localized content
#[derive(Error, Debug)]
pub enum ContentError {
    /// A manual translation could not be completed
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// The persistence collaborator failed
    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),

    /// No entity with this id exists
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// The entity kind does not carry this field
    #[error("{kind} has no '{field}' field")]
    UnsupportedField { kind: EntityKind, field: LogicalField },

    /// The authoring language can never leave the supported set
    #[error("Cannot remove created language '{0}' from supported languages")]
    CreatedLanguageRemoval(Language),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from content handling
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
