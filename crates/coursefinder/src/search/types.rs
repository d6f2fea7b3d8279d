use crate::db::{CourseRecord, DbSavedMatch};
use serde::{Deserialize, Serialize};

use super::format::requirements_text;

/// A course as shown in a results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniMatchResult {
    pub university: String,
    pub course: String,
    #[serde(default)]
    pub course_type: String,
    #[serde(default)]
    pub duration: String,
    /// Human-readable entry requirement summary
    #[serde(default)]
    pub requirements: String,
    /// Course page, or "#" when none is known
    pub course_link: String,
    /// Whether the viewer has bookmarked this course
    #[serde(default)]
    pub is_saved: bool,
}

impl UniMatchResult {
    pub fn from_course(course: &CourseRecord) -> Self {
        let course_link = if course.link.trim().is_empty() {
            "#".to_string()
        } else {
            course.link.clone()
        };

        Self {
            university: course.university_name.clone(),
            course: course.name.clone(),
            course_type: course.course_type.clone(),
            duration: course.duration.clone(),
            requirements: requirements_text(course.requirement.as_ref()),
            course_link,
            is_saved: false,
        }
    }

    /// Whether a saved row refers to this result.
    pub fn is_same_course(&self, saved: &DbSavedMatch) -> bool {
        self.university == saved.university
            && self.course == saved.course
            && self.course_link == saved.course_link
    }
}

impl From<DbSavedMatch> for UniMatchResult {
    fn from(saved: DbSavedMatch) -> Self {
        Self {
            university: saved.university,
            course: saved.course,
            course_type: saved.course_type,
            duration: saved.duration,
            requirements: saved.requirements,
            course_link: saved.course_link,
            is_saved: true,
        }
    }
}
