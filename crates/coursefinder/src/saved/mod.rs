//! Bookmarked courses ("saved matches") and the annotation of search results.

use crate::db::CourseDbManager;
use crate::error::Result;
use crate::search::UniMatchResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Identity of a signed-in viewer, as provided by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
}

/// Flags the results the viewer has saved.
///
/// Anonymous viewers get the results back untouched. Otherwise every flag is
/// recomputed: a result is saved when one of the viewer's saved rows has the
/// same university, course and link.
pub fn mark_saved(
    db: &CourseDbManager,
    mut results: Vec<UniMatchResult>,
    user: Option<UserId>,
) -> Result<Vec<UniMatchResult>> {
    let Some(user) = user else {
        return Ok(results);
    };

    let saved = db.saved_matches_for_user(user.0)?;
    for result in &mut results {
        result.is_saved = saved.iter().any(|row| result.is_same_course(row));
    }

    debug!(
        %user,
        saved = saved.len(),
        marked = results.iter().filter(|r| r.is_saved).count(),
        "Marked saved results"
    );
    Ok(results)
}

/// Saves a snapshot of a result for the user. Saving twice keeps a single row.
pub fn save_match(
    db: &CourseDbManager,
    user: UserId,
    result: &UniMatchResult,
) -> Result<SaveOutcome> {
    let inserted = db.insert_saved_match(
        user.0,
        &result.university,
        &result.course,
        &result.course_type,
        &result.duration,
        &result.requirements,
        &result.course_link,
        Utc::now(),
    );

    match inserted {
        Ok(_) => {
            info!(%user, university = %result.university, course = %result.course, "Saved match");
            Ok(SaveOutcome::Saved)
        }
        Err(e) if e.is_constraint_violation() => {
            debug!(%user, course = %result.course, "Match was already saved");
            Ok(SaveOutcome::AlreadySaved)
        }
        Err(e) => Err(e),
    }
}

/// Removes a saved match; returns whether anything was removed.
pub fn unsave_match(db: &CourseDbManager, user: UserId, result: &UniMatchResult) -> Result<bool> {
    let removed = db.delete_saved_match(
        user.0,
        &result.university,
        &result.course,
        &result.course_link,
    )?;
    if removed > 0 {
        info!(%user, university = %result.university, course = %result.course, "Removed saved match");
    }
    Ok(removed > 0)
}

/// The user's saved matches, oldest first.
pub fn list_saved(db: &CourseDbManager, user: UserId) -> Result<Vec<UniMatchResult>> {
    Ok(db
        .saved_matches_for_user(user.0)?
        .into_iter()
        .map(UniMatchResult::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(university: &str, course: &str) -> UniMatchResult {
        UniMatchResult {
            university: university.to_string(),
            course: course.to_string(),
            course_type: "BSc (Hons)".to_string(),
            duration: "3 years".to_string(),
            requirements: "AAB".to_string(),
            course_link: format!("https://{}.example/", university.to_lowercase()),
            is_saved: false,
        }
    }

    #[test]
    fn test_double_save_keeps_one_row() {
        let db = CourseDbManager::open_in_memory().unwrap();
        let cs = result("Leeds", "Computer Science");

        assert_eq!(save_match(&db, UserId(1), &cs).unwrap(), SaveOutcome::Saved);
        assert_eq!(
            save_match(&db, UserId(1), &cs).unwrap(),
            SaveOutcome::AlreadySaved
        );
        assert_eq!(list_saved(&db, UserId(1)).unwrap().len(), 1);

        // Another user saving the same course is independent
        assert_eq!(save_match(&db, UserId(2), &cs).unwrap(), SaveOutcome::Saved);
    }

    #[test]
    fn test_anonymous_results_untouched() {
        let db = CourseDbManager::open_in_memory().unwrap();
        let mut flagged = result("York", "History");
        flagged.is_saved = true;
        let results = vec![flagged.clone(), result("York", "Law")];

        let marked = mark_saved(&db, results.clone(), None).unwrap();
        assert_eq!(marked, results);
    }

    #[test]
    fn test_mark_saved_recomputes_flags() {
        let db = CourseDbManager::open_in_memory().unwrap();
        let history = result("York", "History");
        let mut law = result("York", "Law");
        law.is_saved = true;
        save_match(&db, UserId(7), &history).unwrap();

        let marked = mark_saved(&db, vec![history.clone(), law], Some(UserId(7))).unwrap();
        assert!(marked[0].is_saved);
        assert!(!marked[1].is_saved);

        // Same course under a different link is a different saved match
        let mut moved = history.clone();
        moved.course_link = "#".to_string();
        let marked = mark_saved(&db, vec![moved], Some(UserId(7))).unwrap();
        assert!(!marked[0].is_saved);
    }

    #[test]
    fn test_unsave() {
        let db = CourseDbManager::open_in_memory().unwrap();
        let maths = result("Bath", "Mathematics");
        save_match(&db, UserId(3), &maths).unwrap();

        assert!(unsave_match(&db, UserId(3), &maths).unwrap());
        assert!(!unsave_match(&db, UserId(3), &maths).unwrap());
        assert!(list_saved(&db, UserId(3)).unwrap().is_empty());
    }

    #[test]
    fn test_list_saved_returns_snapshots() {
        let db = CourseDbManager::open_in_memory().unwrap();
        save_match(&db, UserId(4), &result("Bath", "Mathematics")).unwrap();
        save_match(&db, UserId(4), &result("Bristol", "Physics")).unwrap();

        let saved = list_saved(&db, UserId(4)).unwrap();
        assert_eq!(
            saved.iter().map(|s| s.course.as_str()).collect::<Vec<_>>(),
            vec!["Mathematics", "Physics"]
        );
        assert!(saved.iter().all(|s| s.is_saved));
    }
}
