//! The plain text "search" tab: university names, places and course names.

use super::filters::SearchFilters;
use super::regions::is_listed_city;
use super::types::UniMatchResult;
use crate::db::{CourseDbManager, CoursePredicate, CourseQuery};
use crate::error::Result;
use crate::nlp::expand_query_with_synonyms;
use std::collections::HashSet;
use tracing::{debug, info};

/// Most rows kept when a general search is reduced to one course per university
pub const TEXT_RESULT_LIMIT: usize = 200;

/// How a text query is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SearchScope {
    /// Names one university (exactly, or as the only substring match): all its courses
    University(Vec<i64>),
    /// Names a place: every matching course
    Place,
    /// Anything else: one course per university
    General,
}

/// Searches courses by course name, university name or university location.
///
/// A blank query returns nothing.
pub fn search_by_text(
    db: &CourseDbManager,
    query: &str,
    filters: &SearchFilters,
) -> Result<Vec<UniMatchResult>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let terms = expand_query_with_synonyms(query);
    let mut course_query = CourseQuery::new().filter(CoursePredicate::TextMatchesAny(terms));
    for predicate in filters.to_predicates() {
        course_query.push(predicate);
    }

    let scope = resolve_scope(db, query)?;
    debug!(query, ?scope, "Resolved text search scope");
    if let SearchScope::University(ids) = &scope {
        course_query.push(CoursePredicate::UniversityIn(ids.clone()));
    }

    let courses = db.query_courses(&course_query)?;
    let results: Vec<UniMatchResult> = match scope {
        SearchScope::General => {
            let mut seen = HashSet::new();
            courses
                .iter()
                .filter(|course| seen.insert(course.university_id))
                .take(TEXT_RESULT_LIMIT)
                .map(UniMatchResult::from_course)
                .collect()
        }
        SearchScope::University(_) | SearchScope::Place => {
            courses.iter().map(UniMatchResult::from_course).collect()
        }
    };

    info!(query, matched = courses.len(), results = results.len(), "Text search complete");
    Ok(results)
}

fn resolve_scope(db: &CourseDbManager, query: &str) -> Result<SearchScope> {
    let exact = db.universities_named(query)?;
    if !exact.is_empty() {
        return Ok(SearchScope::University(
            exact.iter().map(|u| u.university_id).collect(),
        ));
    }

    let containing = db.universities_name_containing(query)?;
    if let [only] = containing.as_slice() {
        return Ok(SearchScope::University(vec![only.university_id]));
    }

    if db.university_location_exists(query)? || is_listed_city(query) {
        return Ok(SearchScope::Place);
    }

    Ok(SearchScope::General)
}

/// Summary line for the text search results table.
pub fn text_status_message(query: &str, total: usize, shown: usize) -> String {
    if total > 0 {
        format!("Showing {shown} of {total} results for '{query}'")
    } else {
        format!("No universities or courses found for '{query}'")
    }
}
