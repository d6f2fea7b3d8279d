//! Course-name interest detection over free text.

use super::vocabulary::COURSES;
use regex::Regex;
use std::sync::LazyLock;

static COURSE_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{})\b", COURSES.alternation())).unwrap()
});

/// Finds every known course name (or synonym) mentioned in `text`.
///
/// Returns canonical names in order of first mention, without duplicates.
pub fn parse_interests(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    for mention in COURSE_MENTION.find_iter(text) {
        if let Some(course) = COURSES.canonical(mention.as_str()) {
            push_unique(&mut found, course.to_string());
        }
    }
    found
}

/// Appends `secondary` to `primary`, skipping entries already present in any casing.
pub fn merge_interests(primary: Vec<String>, secondary: Vec<String>) -> Vec<String> {
    let mut merged = Vec::with_capacity(primary.len() + secondary.len());
    for interest in primary.into_iter().chain(secondary) {
        push_unique(&mut merged, interest);
    }
    merged
}

pub(crate) fn push_unique(list: &mut Vec<String>, item: String) {
    let key = item.to_lowercase();
    if !list.iter().any(|existing| existing.to_lowercase() == key) {
        list.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_canonical_names_in_order() {
        assert_eq!(
            parse_interests("thinking about maths or maybe comp sci, definitely not medicine"),
            vec!["Mathematics", "Computer Science", "Medicine"]
        );
    }

    #[test]
    fn test_synonyms_are_deduplicated() {
        assert_eq!(
            parse_interests("CS, computing and Computer Science"),
            vec!["Computer Science"]
        );
    }

    #[test]
    fn test_matches_whole_words_only() {
        // "eng" and "vet" are spellings but must not match inside longer words
        assert_eq!(parse_interests("velvet engine"), Vec::<String>::new());
        assert_eq!(parse_interests("English breakfast"), vec!["English"]);
    }

    #[test]
    fn test_merge_keeps_first_casing() {
        let merged = merge_interests(
            vec!["astrophysics".to_string(), "Law".to_string()],
            vec!["LAW".to_string(), "History".to_string()],
        );
        assert_eq!(merged, vec!["astrophysics", "Law", "History"]);
    }
}
