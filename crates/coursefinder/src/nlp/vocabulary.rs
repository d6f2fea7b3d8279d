//! Fixed vocabularies: school subjects that carry grades, and course names with
//! their synonyms.

use std::collections::HashMap;
use std::sync::LazyLock;

type Table = &'static [(&'static str, &'static [&'static str])];

/// School subjects a grade can be attached to, keyed by canonical name.
const SUBJECT_TABLE: Table = &[
    ("mathematics", &["maths", "math"]),
    ("further mathematics", &["further maths", "further math"]),
    ("physics", &[]),
    ("chemistry", &[]),
    ("biology", &["bio"]),
    ("computer science", &["computing", "comp sci", "compsci", "cs"]),
    ("english literature", &["english lit"]),
    ("english language", &["english lang"]),
    ("english", &[]),
    ("history", &[]),
    ("geography", &[]),
    ("economics", &["econ", "econs"]),
    ("psychology", &["psych"]),
    ("sociology", &[]),
    ("business studies", &["business"]),
    ("art and design", &["art"]),
    ("music", &[]),
    ("drama", &["theatre studies"]),
    ("french", &[]),
    ("spanish", &[]),
    ("german", &[]),
    ("law", &[]),
    ("philosophy", &[]),
    ("politics", &["government and politics"]),
    ("religious studies", &[]),
    ("media studies", &["media"]),
    ("design and technology", &["product design"]),
    ("physical education", &[]),
    ("statistics", &[]),
    ("accounting", &[]),
    ("electronics", &[]),
    ("classics", &["classical civilisation"]),
    ("latin", &[]),
    ("engineering", &[]),
    ("health and social care", &[]),
    ("applied science", &[]),
    ("information technology", &["ict"]),
];

/// Course names and the spellings that collapse onto them.
const COURSE_TABLE: Table = &[
    ("Computer Science", &["computing", "comp sci", "compsci", "cs", "computers"]),
    ("Mathematics", &["maths", "math"]),
    ("Medicine", &["medical", "mbbs"]),
    ("Law", &["llb", "legal studies"]),
    ("Economics", &["econ", "econs"]),
    ("Psychology", &["psych"]),
    ("Business", &["business management", "business studies", "management"]),
    ("Engineering", &["eng"]),
    ("Mechanical Engineering", &["mech eng", "mechanical"]),
    ("Electrical Engineering", &["electronic engineering", "elec eng"]),
    ("Civil Engineering", &["civil eng"]),
    ("English", &["english literature", "english lit", "english language"]),
    ("History", &[]),
    ("Physics", &[]),
    ("Chemistry", &[]),
    ("Biology", &["bio", "biological sciences"]),
    ("Geography", &[]),
    ("Philosophy", &[]),
    ("Politics", &["political science", "polsci", "international relations"]),
    ("Sociology", &[]),
    ("Architecture", &[]),
    ("Nursing", &[]),
    ("Accounting", &["accountancy"]),
    ("Finance", &[]),
    ("Art", &["fine art", "art and design"]),
    ("Music", &[]),
    ("Drama", &["theatre", "acting", "performing arts"]),
    ("Dentistry", &["dental"]),
    ("Veterinary Science", &["veterinary medicine", "vet science", "vet"]),
    ("Pharmacy", &[]),
    ("Biomedical Science", &["biomed"]),
    ("Sports Science", &["sport science"]),
    ("Data Science", &[]),
    ("Artificial Intelligence", &["machine learning"]),
    ("Software Engineering", &[]),
    ("Education", &["teaching"]),
    ("Journalism", &[]),
    ("Marketing", &[]),
    ("Criminology", &[]),
];

pub(crate) static SUBJECTS: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary::build(SUBJECT_TABLE));
pub(crate) static COURSES: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary::build(COURSE_TABLE));

/// Lookup table from every spelling (canonical name included) to its canonical name.
pub(crate) struct Vocabulary {
    by_alias: HashMap<String, &'static str>,
    alternation: String,
}

impl Vocabulary {
    fn build(table: Table) -> Self {
        let mut by_alias = HashMap::new();
        let mut aliases = Vec::new();

        for (canonical, spellings) in table {
            for spelling in std::iter::once(canonical).chain(spellings.iter()) {
                let key = normalize_phrase(spelling);
                by_alias.entry(key.clone()).or_insert(*canonical);
                aliases.push(key);
            }
        }

        // Longest first so "further maths" wins over "maths"
        aliases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        aliases.dedup();

        let alternation = aliases
            .iter()
            .map(|a| regex::escape(a).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");

        Self {
            by_alias,
            alternation,
        }
    }

    /// Canonical name for an exact (case and whitespace insensitive) spelling.
    pub fn canonical(&self, phrase: &str) -> Option<&'static str> {
        self.by_alias.get(&normalize_phrase(phrase)).copied()
    }

    /// Regex alternation of all spellings, longest first, without anchors.
    pub fn alternation(&self) -> &str {
        &self.alternation
    }
}

fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_lookup_is_case_and_space_insensitive() {
        assert_eq!(SUBJECTS.canonical("Further  MATHS"), Some("further mathematics"));
        assert_eq!(SUBJECTS.canonical("mathematics"), Some("mathematics"));
        assert_eq!(COURSES.canonical("CompSci"), Some("Computer Science"));
        assert_eq!(COURSES.canonical("astrophysics"), None);
    }

    #[test]
    fn test_alternation_prefers_longer_spellings() {
        let alt = SUBJECTS.alternation();
        let further = alt.find(r"further\s+maths").unwrap();
        let plain = alt.find("|maths|").unwrap();
        assert!(further < plain);
    }
}
