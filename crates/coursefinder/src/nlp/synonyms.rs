//! Synonym expansion for search terms.

use super::vocabulary::COURSES;

/// Converts a search term to its canonical subject name if it is a known synonym.
///
/// Matching is exact after trimming and ignoring case. Known spellings collapse
/// to the lowercased canonical name; anything else is passed through lowercased
/// so it can still be used as a substring filter. Blank input yields no terms.
pub fn expand_query_with_synonyms(term: &str) -> Vec<String> {
    let term = term.trim();
    if term.is_empty() {
        return Vec::new();
    }

    match COURSES.canonical(term) {
        Some(subject) => vec![subject.to_lowercase()],
        None => vec![term.to_lowercase()],
    }
}
