/*!
 * Per-language completion flags and the derived supported-language set.
 *
 * A language is complete when every required field of the entity kind has
 * content in that language. Complete languages are promoted into
 * `supported_languages`; promotion only ever adds.
 */

use log::debug;

use super::entity::LocalizedEntity;
use crate::language::Language;

/// Whether every required field of `lang` has content. Pure.
pub fn is_complete(entity: &LocalizedEntity, lang: Language) -> bool {
    entity
        .kind()
        .required_fields()
        .iter()
        .all(|field| entity.has_content(lang, *field))
}

/// Compute the completion of `lang`, store it on the entity and return it
pub fn recompute(entity: &mut LocalizedEntity, lang: Language) -> bool {
    let complete = is_complete(entity, lang);
    if entity.is_complete(lang) != complete {
        debug!(
            "Completion of {} '{}' in {} changed to {}",
            entity.kind(),
            entity.id(),
            lang,
            complete
        );
    }
    entity.set_completion_flag(lang, complete);
    complete
}

/// Add every complete language to `supported_languages`.
///
/// Returns the languages that were newly added, in canonical order.
pub fn promote_supported(entity: &mut LocalizedEntity) -> Vec<Language> {
    let mut added = Vec::new();
    for lang in Language::ALL {
        if entity.is_complete(lang) && entity.add_supported_language(lang) {
            added.push(lang);
        }
    }
    added
}

/// Recompute the given languages, then promote complete ones
pub fn sync(entity: &mut LocalizedEntity, languages: &[Language]) -> Vec<Language> {
    for lang in languages {
        recompute(entity, *lang);
    }
    promote_supported(entity)
}
