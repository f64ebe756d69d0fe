/*!
 * Supported content languages and display-language resolution.
 *
 * DrillQuiz content exists in a closed set of five languages. Codes coming
 * from the outside world (query parameters, stored profiles, the
 * `Accept-Language` header) are normalized here; anything outside the set
 * is simply "unsupported" and never an error.
 */

use isolang::Language as IsoLanguage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::content::users::{ActingUser, UserSettings};

/// A supported content language.
///
/// The declaration order is the canonical order used everywhere a stable
/// language ordering is needed (fallback chains, `supported_languages`
/// rendering, map iteration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ko,
    En,
    Es,
    Zh,
    Ja,
}

/// Language used when nothing else applies
pub const DEFAULT_LANGUAGE: Language = Language::En;

impl Language {
    /// Every supported language in canonical order
    pub const ALL: [Language; 5] = [
        Language::Ko,
        Language::En,
        Language::Es,
        Language::Zh,
        Language::Ja,
    ];

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ko => "ko",
            Self::En => "en",
            Self::Es => "es",
            Self::Zh => "zh",
            Self::Ja => "ja",
        }
    }

    /// English name used in translation prompts
    pub fn english_name(&self) -> &'static str {
        match self {
            // Content is authored and stored in simplified script
            Self::Zh => "Chinese (Simplified)",
            _ => IsoLanguage::from_639_1(self.code())
                .map(|lang| lang.to_name())
                .unwrap_or_else(|| self.code()),
        }
    }

    /// Parse a language code or tag into a supported language.
    ///
    /// Accepts ISO 639-1 and ISO 639-2 codes, case-insensitively, with an
    /// optional region or script suffix (`zh-CN`, `pt_BR`). Returns `None` for
    /// anything outside the supported set.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();

        let part1 = match primary.len() {
            2 => primary,
            3 => match primary.as_str() {
                // ISO 639-2/B form of Chinese
                "chi" => "zh".to_string(),
                _ => IsoLanguage::from_639_3(&primary)?.to_639_1()?.to_string(),
            },
            _ => return None,
        };

        match part1.as_str() {
            "ko" => Some(Self::Ko),
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            "zh" => Some(Self::Zh),
            "ja" => Some(Self::Ja),
            _ => None,
        }
    }

    /// Whether a code names a supported language
    pub fn is_supported(code: &str) -> bool {
        Self::from_code(code).is_some()
    }
}

impl Default for Language {
    fn default() -> Self {
        DEFAULT_LANGUAGE
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| anyhow::anyhow!("Unsupported language code: {}", s))
    }
}

/// Parse an `Accept-Language` header into language tags ordered by preference.
///
/// Entries are sorted by descending quality, keeping header order for ties.
/// Entries with `q=0` are dropped, the `*` wildcard is skipped and a
/// malformed quality value counts as `1.0`.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut entries: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }

            let quality = pieces
                .filter_map(|param| param.trim().strip_prefix("q="))
                .next()
                .map(|q| q.trim().parse::<f32>().unwrap_or(1.0))
                .unwrap_or(1.0);

            if quality <= 0.0 {
                return None;
            }

            Some((tag.to_string(), quality))
        })
        .collect();

    // sort_by is stable, ties keep header order
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries.into_iter().map(|(tag, _)| tag).collect()
}

/// Pick the display language for a request.
///
/// Precedence: explicit request parameter, then the user's stored
/// preference, then the first supported entry of `Accept-Language`, then
/// `default`. Unsupported or malformed inputs fall through to the next level.
pub fn resolve_language(
    request_param: Option<&str>,
    profile_language: Option<&str>,
    accept_language: Option<&str>,
    default: Language,
) -> Language {
    if let Some(lang) = request_param.and_then(Language::from_code) {
        return lang;
    }

    if let Some(lang) = profile_language.and_then(Language::from_code) {
        return lang;
    }

    if let Some(header) = accept_language {
        if let Some(lang) = parse_accept_language(header)
            .iter()
            .find_map(|tag| Language::from_code(tag))
        {
            return lang;
        }
    }

    default
}

/// Resolve the display language for an acting user.
///
/// Anonymous users have no stored preference. A failing settings lookup is
/// logged and treated as "no preference" so resolution stays total.
pub async fn resolve_for_user(
    users: &dyn UserSettings,
    user: &ActingUser,
    request_param: Option<&str>,
    accept_language: Option<&str>,
    default: Language,
) -> Language {
    let stored = match user {
        ActingUser::Anonymous => None,
        ActingUser::User(_) => match users.language_preference(user).await {
            Ok(preference) => preference,
            Err(e) => {
                log::warn!("Could not read language preference for {}: {}", user, e);
                None
            }
        },
    };

    resolve_language(request_param, stored.as_deref(), accept_language, default)
}
