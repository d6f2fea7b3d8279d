//! The grade-based "matches" search.

use super::filters::SearchFilters;
use super::format::title_case;
use super::types::UniMatchResult;
use super::ucas::calculate_ucas_points;
use crate::db::{CourseDbManager, CoursePredicate, CourseQuery};
use crate::error::Result;
use crate::nlp::{
    expand_query_with_synonyms, merge_interests, parse_interests, GradeParser, ParsedGrades,
};
use serde::Serialize;
use tracing::{debug, info};

/// Most courses returned by a grade search
pub const MATCH_RESULT_LIMIT: usize = 20;

/// What a grade search understood and found.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSearchOutcome {
    pub query: String,
    pub parsed_grades: ParsedGrades,
    pub interests: Vec<String>,
    /// Zero when no grades were recognized
    pub ucas_points: u32,
    pub matching_courses: Vec<UniMatchResult>,
}

impl MatchSearchOutcome {
    /// Summary line for the results table; `shown` is the index of the last result on the page.
    pub fn status_message(&self, shown: usize) -> String {
        let grades_text = self
            .parsed_grades
            .iter()
            .map(|(subject, grade)| format!("{grade} in {}", title_case(subject)))
            .collect::<Vec<_>>()
            .join(", ");
        let interests_text = self
            .interests
            .iter()
            .map(|interest| title_case(interest))
            .collect::<Vec<_>>()
            .join(", ");
        let total = self.matching_courses.len();
        let has_grades = !grades_text.is_empty();
        let has_interests = !interests_text.is_empty();

        if total > 0 {
            let showing = format!("Showing {shown} of {total} courses");
            match (has_grades, has_interests) {
                (true, true) => {
                    format!("{showing} accepting: {grades_text} • Interests: {interests_text}")
                }
                (true, false) => format!(
                    "{showing} accepting: {grades_text} ({} UCAS points)",
                    self.ucas_points
                ),
                (false, true) => format!("{showing} in: {interests_text}"),
                (false, false) => showing,
            }
        } else {
            match (has_grades, has_interests) {
                (true, true) => format!(
                    "No courses found accepting: {grades_text} with interests in {interests_text}"
                ),
                (true, false) => format!("No courses found for: {grades_text}"),
                (false, true) => format!("No courses found for: {interests_text}"),
                (false, false) => {
                    format!("Could not parse grades or interests from: {}", self.query)
                }
            }
        }
    }
}

/// Finds courses a student qualifies for from a free-text description of
/// their grades and interests.
///
/// With grades worth any points, courses must ask for no more than the
/// student's total (or publish no requirement), narrowed to the interests when
/// some were named. With interests only, every course named after one of them
/// matches. With neither, nothing matches. The filters are applied on top and
/// at most [`MATCH_RESULT_LIMIT`] courses are returned.
pub fn search_by_grades(
    db: &CourseDbManager,
    query: &str,
    filters: &SearchFilters,
) -> Result<MatchSearchOutcome> {
    let parsed = GradeParser::new().parse(query);
    let interests = merge_interests(parsed.interests, parse_interests(&parsed.residual));
    let ucas_points = calculate_ucas_points(&parsed.grades);

    let mut outcome = MatchSearchOutcome {
        query: query.to_string(),
        parsed_grades: parsed.grades,
        interests,
        ucas_points,
        matching_courses: Vec::new(),
    };

    let mut course_query = CourseQuery::new().limit(MATCH_RESULT_LIMIT);
    if ucas_points > 0 {
        if !outcome.interests.is_empty() {
            course_query.push(interest_predicate(&outcome.interests));
        }
        course_query.push(CoursePredicate::Qualifies { ucas_points });
    } else if !outcome.interests.is_empty() {
        course_query.push(interest_predicate(&outcome.interests));
    } else {
        debug!(query, "No grades or interests to match on");
        return Ok(outcome);
    }

    for predicate in filters.to_predicates() {
        course_query.push(predicate);
    }

    outcome.matching_courses = db
        .query_courses(&course_query)?
        .iter()
        .map(UniMatchResult::from_course)
        .collect();

    info!(
        grades = outcome.parsed_grades.len(),
        interests = outcome.interests.len(),
        ucas_points,
        results = outcome.matching_courses.len(),
        "Grade search complete"
    );

    Ok(outcome)
}

fn interest_predicate(interests: &[String]) -> CoursePredicate {
    CoursePredicate::NameMatchesAny(
        interests
            .iter()
            .flat_map(|interest| expand_query_with_synonyms(interest))
            .collect(),
    )
}
