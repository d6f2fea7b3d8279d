//! Composable course predicates and their SQL translation.
//!
//! Every predicate narrows the result set; a [`CourseQuery`] is the AND of its
//! predicates. Text comparisons are case-insensitive substring matches.

use rusqlite::types::Value;

/// Unicode lower-casing SQL function registered on every connection.
///
/// SQLite's own `LOWER()` and `NOCASE` only fold ASCII.
pub(crate) const FOLD_FN: &str = "unicode_lower";

/// Duration band selected by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationBand {
    /// "5+ years": any of 5, 6 or 7 years
    FivePlusYears,
    /// An exact number of years, matched as "<n> year"
    Years(u32),
}

impl DurationBand {
    fn year_counts(&self) -> Vec<u32> {
        match self {
            DurationBand::FivePlusYears => vec![5, 6, 7],
            DurationBand::Years(n) => vec![*n],
        }
    }
}

/// A single filter over courses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoursePredicate {
    /// Course asks for at most `ucas_points`, or publishes no requirement
    Qualifies { ucas_points: u32 },
    /// Course asks for at least this many points
    MinRequiredPoints(u32),
    CourseTypeContains(String),
    Duration(DurationBand),
    ModeContains(String),
    /// Course or university location contains one of the cities or the literal
    Location { cities: Vec<String>, literal: String },
    /// Published requirement with non-blank display grades
    HasPublishedGrades,
    /// No requirement record, or one flagged as having no requirements
    NoPublishedRequirements,
    /// Course name contains any of the terms
    NameMatchesAny(Vec<String>),
    /// Course name, university name or university location contains any term
    TextMatchesAny(Vec<String>),
    UniversityIn(Vec<i64>),
}

/// AND-combination of predicates, ordered by university then course name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseQuery {
    predicates: Vec<CoursePredicate>,
    limit: Option<usize>,
}

impl CourseQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, predicate: CoursePredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn push(&mut self, predicate: CoursePredicate) {
        self.predicates.push(predicate);
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn predicates(&self) -> &[CoursePredicate] {
        &self.predicates
    }

    /// Builds the WHERE/ORDER/LIMIT tail of the course select and its parameters.
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let clauses: Vec<String> = self
            .predicates
            .iter()
            .map(|p| predicate_sql(p, &mut params))
            .collect();

        let mut sql = String::new();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY u.name, c.name, c.course_id");
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            params.push(Value::Integer(limit as i64));
        }

        (sql, params)
    }
}

const NEVER: &str = "0";

fn predicate_sql(predicate: &CoursePredicate, params: &mut Vec<Value>) -> String {
    match predicate {
        CoursePredicate::Qualifies { ucas_points } => {
            params.push(Value::Integer(*ucas_points as i64));
            "(er.entry_requirement_id IS NULL OR er.has_requirements = 0 \
             OR er.min_ucas_points <= ?)"
                .to_string()
        }
        CoursePredicate::MinRequiredPoints(points) => {
            params.push(Value::Integer(*points as i64));
            "er.min_ucas_points >= ?".to_string()
        }
        CoursePredicate::CourseTypeContains(value) => contains("c.course_type", value, params),
        CoursePredicate::ModeContains(value) => contains("c.mode", value, params),
        CoursePredicate::Duration(band) => {
            // The number must not follow a digit, so "3 year" does not match "13 years"
            let parts: Vec<String> = band
                .year_counts()
                .into_iter()
                .map(|n| {
                    params.push(Value::Text(duration_pattern(n)));
                    format!("(' ' || {FOLD_FN}(c.duration)) GLOB ?")
                })
                .collect();
            any_of(parts)
        }
        CoursePredicate::Location { cities, literal } => {
            let mut parts = Vec::new();
            for place in cities.iter().chain(std::iter::once(literal)) {
                if place.trim().is_empty() {
                    continue;
                }
                parts.push(format!(
                    "({} OR {})",
                    contains("c.location", place, params),
                    contains("u.location", place, params)
                ));
            }
            any_of(parts)
        }
        CoursePredicate::HasPublishedGrades => {
            "(er.has_requirements = 1 AND TRIM(er.display_grades) <> '')".to_string()
        }
        CoursePredicate::NoPublishedRequirements => {
            "(er.entry_requirement_id IS NULL OR er.has_requirements = 0)".to_string()
        }
        CoursePredicate::NameMatchesAny(terms) => {
            let parts = terms
                .iter()
                .map(|t| contains("c.name", t, params))
                .collect();
            any_of(parts)
        }
        CoursePredicate::TextMatchesAny(terms) => {
            let parts = terms
                .iter()
                .map(|t| {
                    format!(
                        "({} OR {} OR {})",
                        contains("c.name", t, params),
                        contains("u.name", t, params),
                        contains("u.location", t, params)
                    )
                })
                .collect();
            any_of(parts)
        }
        CoursePredicate::UniversityIn(ids) => {
            if ids.is_empty() {
                return NEVER.to_string();
            }
            let marks = vec!["?"; ids.len()].join(", ");
            params.extend(ids.iter().map(|id| Value::Integer(*id)));
            format!("c.university_id IN ({marks})")
        }
    }
}

fn contains(column: &str, value: &str, params: &mut Vec<Value>) -> String {
    params.push(Value::Text(like_pattern(value)));
    format!("{FOLD_FN}({column}) LIKE ? ESCAPE '\\'")
}

fn duration_pattern(years: u32) -> String {
    format!("*[^0-9]{years} year*")
}

fn any_of(parts: Vec<String>) -> String {
    if parts.is_empty() {
        NEVER.to_string()
    } else {
        format!("({})", parts.join(" OR "))
    }
}

/// Lowercases `value` and wraps it for a LIKE substring match, escaping wildcards.
pub(crate) fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for ch in value.trim().to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" 100%_Pure "), "%100\\%\\_pure%");
    }

    #[test]
    fn test_empty_query_has_no_where_clause() {
        let (sql, params) = CourseQuery::new().to_sql();
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("ORDER BY u.name, c.name"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_predicates_are_and_combined() {
        let query = CourseQuery::new()
            .filter(CoursePredicate::Qualifies { ucas_points: 120 })
            .filter(CoursePredicate::ModeContains("Full".into()))
            .limit(20);
        let (sql, params) = query.to_sql();

        assert!(sql.contains(" AND "));
        assert!(sql.ends_with("LIMIT ?"));
        assert_eq!(params.len(), 3);
        assert_eq!(params[0], Value::Integer(120));
        assert_eq!(params[1], Value::Text("%full%".into()));
        assert_eq!(params[2], Value::Integer(20));
    }

    #[test]
    fn test_empty_term_list_matches_nothing() {
        let (sql, _) = CourseQuery::new()
            .filter(CoursePredicate::NameMatchesAny(vec![]))
            .to_sql();
        assert!(sql.contains("WHERE 0"));
    }

    #[test]
    fn test_five_plus_duration_expands_to_three_bands() {
        let (_, params) = CourseQuery::new()
            .filter(CoursePredicate::Duration(DurationBand::FivePlusYears))
            .to_sql();
        assert_eq!(
            params,
            vec![
                Value::Text("*[^0-9]5 year*".into()),
                Value::Text("*[^0-9]6 year*".into()),
                Value::Text("*[^0-9]7 year*".into()),
            ]
        );
    }
}
