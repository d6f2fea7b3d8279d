/// Database types for universities, courses and their entry requirements
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbUniversity {
    pub university_id: i64,
    pub name: String,
    pub location: String,
    pub website: String,
    pub all_courses_url: String,
}

/// Entry requirement attached to at most one course.
///
/// `has_requirements == false` means the course publishes no requirement, which
/// is different from a requirement of zero points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbEntryRequirement {
    pub entry_requirement_id: i64,
    pub course_id: i64,
    pub min_ucas_points: u32,
    pub min_grade_required: String,
    pub display_grades: String,
    pub btec_grades: String,
    pub accepts_ucas: bool,
    pub has_requirements: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbSubjectRequirement {
    pub subject_requirement_id: i64,
    pub entry_requirement_id: i64,
    pub subject: String,
    pub grade: String,
}

/// A course joined with its university and (optional) entry requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseRecord {
    pub course_id: i64,
    pub university_id: i64,
    pub university_name: String,
    pub university_location: String,
    pub name: String,
    pub course_type: String,
    pub duration: String,
    pub mode: String,
    pub location: String,
    pub start_date: String,
    pub link: String,
    pub requirement: Option<DbEntryRequirement>,
}

/// A bookmarked result, stored as a snapshot rather than a course reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbSavedMatch {
    pub saved_match_id: i64,
    pub user_id: i64,
    pub university: String,
    pub course: String,
    pub course_type: String,
    pub duration: String,
    pub requirements: String,
    pub course_link: String,
    pub saved_at: DateTime<Utc>,
}

// Write-side inputs, used by the importer and by tests.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUniversity {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub all_courses_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCourse {
    pub name: String,
    #[serde(default)]
    pub course_type: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntryRequirement {
    #[serde(default)]
    pub min_ucas_points: u32,
    #[serde(default)]
    pub min_grade_required: String,
    #[serde(default)]
    pub display_grades: String,
    #[serde(default)]
    pub btec_grades: String,
    #[serde(default = "default_true")]
    pub accepts_ucas: bool,
    #[serde(default = "default_true")]
    pub has_requirements: bool,
}

impl Default for NewEntryRequirement {
    fn default() -> Self {
        Self {
            min_ucas_points: 0,
            min_grade_required: String::new(),
            display_grades: String::new(),
            btec_grades: String::new(),
            accepts_ucas: true,
            has_requirements: true,
        }
    }
}

fn default_true() -> bool {
    true
}
