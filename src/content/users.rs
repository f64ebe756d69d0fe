/*!
 * User settings collaborator.
 */

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

/// The user on whose behalf content is read or written
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActingUser {
    /// Unauthenticated request
    Anonymous,
    /// Authenticated user, by id
    User(String),
}

impl ActingUser {
    /// Authenticated user with the given id
    pub fn user(id: impl Into<String>) -> Self {
        Self::User(id.into())
    }

    /// Id of an authenticated user
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(id),
        }
    }
}

impl fmt::Display for ActingUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::User(id) => write!(f, "user:{}", id),
        }
    }
}

/// Per-user settings owned outside this crate
#[async_trait]
pub trait UserSettings: Send + Sync {
    /// Stored display language code, if any. The code is returned as stored
    /// and may name an unsupported language.
    async fn language_preference(&self, user: &ActingUser) -> Result<Option<String>>;

    /// Whether content written by this user may be machine-translated.
    /// Anonymous users and users without a profile are enabled.
    async fn is_auto_translate_enabled(&self, user: &ActingUser) -> Result<bool>;
}
