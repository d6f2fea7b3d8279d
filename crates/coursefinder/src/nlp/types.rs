/// Types produced by the query parser
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Subject to grade mapping in order of first mention.
///
/// Re-inserting a subject replaces its grade but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedGrades(Vec<(String, String)>);

impl ParsedGrades {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the grade for a subject, returning the grade it replaced.
    pub fn insert(&mut self, subject: impl Into<String>, grade: impl Into<String>) -> Option<String> {
        let subject = subject.into();
        let grade = grade.into();
        match self.0.iter_mut().find(|(s, _)| *s == subject) {
            Some((_, existing)) => Some(std::mem::replace(existing, grade)),
            None => {
                self.0.push((subject, grade));
                None
            }
        }
    }

    pub fn get(&self, subject: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(s, _)| s == subject)
            .map(|(_, g)| g.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParsedGrades {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.0
            .iter()
            .map(as_pair as fn(&'a (String, String)) -> (&'a str, &'a str))
    }
}

fn as_pair((subject, grade): &(String, String)) -> (&str, &str) {
    (subject.as_str(), grade.as_str())
}

impl<S: Into<String>, G: Into<String>> FromIterator<(S, G)> for ParsedGrades {
    fn from_iter<I: IntoIterator<Item = (S, G)>>(iter: I) -> Self {
        let mut grades = ParsedGrades::new();
        for (subject, grade) in iter {
            grades.insert(subject, grade);
        }
        grades
    }
}

impl Serialize for ParsedGrades {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (subject, grade) in &self.0 {
            map.serialize_entry(subject, grade)?;
        }
        map.end()
    }
}

/// Result of parsing a free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub grades: ParsedGrades,
    /// Interests named after trigger words ("interested in", "want to study", ...)
    pub interests: Vec<String>,
    /// The query with every recognized grade mention blanked out
    pub residual: String,
}

impl ParsedQuery {
    pub fn is_empty(&self) -> bool {
        self.grades.is_empty() && self.interests.is_empty()
    }
}
