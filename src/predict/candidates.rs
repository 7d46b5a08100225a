//! Candidate language ordering for the cascade.

use crate::models::LanguageCode;

/// Ordered, de-duplicated candidates: detected, anticipated, default.
///
/// Unknown entries are dropped and only the first occurrence of a language is
/// kept. The result holds between zero and three languages.
pub fn order(
    detected: &LanguageCode,
    anticipated: &LanguageCode,
    default: &LanguageCode,
) -> Vec<LanguageCode> {
    let mut candidates: Vec<LanguageCode> = Vec::with_capacity(3);
    for language in [detected, anticipated, default] {
        if language.is_unknown() || candidates.contains(language) {
            continue;
        }
        candidates.push(language.clone());
    }
    candidates
}
