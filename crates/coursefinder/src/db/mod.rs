/// Database module for university, course and saved-match data

mod query;
mod types;

pub use query::{CoursePredicate, CourseQuery, DurationBand};
pub use types::{
    CourseRecord, DbEntryRequirement, DbSavedMatch, DbSubjectRequirement, DbUniversity,
    NewCourse, NewEntryRequirement, NewUniversity,
};

use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::sync::Mutex;
use tracing::debug;

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_coursefinder.sql");

const COURSE_SELECT: &str = "SELECT c.course_id, c.university_id, u.name, u.location,
        c.name, c.course_type, c.duration, c.mode, c.location, c.start_date, c.link,
        er.entry_requirement_id, er.min_ucas_points, er.min_grade_required,
        er.display_grades, er.btec_grades, er.accepts_ucas, er.has_requirements
     FROM courses c
     JOIN universities u ON c.university_id = u.university_id
     LEFT JOIN entry_requirements er ON er.course_id = c.course_id";

pub struct CourseDbManager {
    db: Mutex<Connection>,
}

impl CourseDbManager {
    /// Opens (or creates) the database at `db_path` and initializes the schema
    pub fn new(db_path: &str) -> Result<Self> {
        Self::from_connection(Connection::open(db_path)?)
    }

    /// Creates a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        conn.create_scalar_function(
            query::FOLD_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| text.to_lowercase())),
        )?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Inserts a university, or updates it if one with the same name exists
    pub fn upsert_university(&self, university: &NewUniversity) -> Result<i64> {
        let db = self.db.lock()?;

        db.execute(
            "INSERT INTO universities (name, location, website, all_courses_url)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                location = excluded.location,
                website = excluded.website,
                all_courses_url = excluded.all_courses_url",
            (
                &university.name,
                &university.location,
                &university.website,
                &university.all_courses_url,
            ),
        )?;

        Ok(db.query_row(
            "SELECT university_id FROM universities WHERE name = ?",
            [&university.name],
            |row| row.get(0),
        )?)
    }

    /// Inserts a course for a university, or updates the one with the same name
    pub fn upsert_course(&self, university_id: i64, course: &NewCourse) -> Result<i64> {
        let db = self.db.lock()?;

        db.execute(
            "INSERT INTO courses (
                university_id, name, course_type, duration, mode, location, start_date, link
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(university_id, name) DO UPDATE SET
                course_type = excluded.course_type,
                duration = excluded.duration,
                mode = excluded.mode,
                location = excluded.location,
                start_date = excluded.start_date,
                link = excluded.link",
            (
                university_id,
                &course.name,
                &course.course_type,
                &course.duration,
                &course.mode,
                &course.location,
                &course.start_date,
                &course.link,
            ),
        )?;

        Ok(db.query_row(
            "SELECT course_id FROM courses WHERE university_id = ? AND name = ?",
            (university_id, &course.name),
            |row| row.get(0),
        )?)
    }

    /// Sets the single entry requirement of a course
    pub fn upsert_entry_requirement(
        &self,
        course_id: i64,
        requirement: &NewEntryRequirement,
    ) -> Result<i64> {
        let db = self.db.lock()?;

        db.execute(
            "INSERT INTO entry_requirements (
                course_id, min_ucas_points, min_grade_required, display_grades,
                btec_grades, accepts_ucas, has_requirements
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(course_id) DO UPDATE SET
                min_ucas_points = excluded.min_ucas_points,
                min_grade_required = excluded.min_grade_required,
                display_grades = excluded.display_grades,
                btec_grades = excluded.btec_grades,
                accepts_ucas = excluded.accepts_ucas,
                has_requirements = excluded.has_requirements",
            (
                course_id,
                requirement.min_ucas_points,
                &requirement.min_grade_required,
                &requirement.display_grades,
                &requirement.btec_grades,
                requirement.accepts_ucas,
                requirement.has_requirements,
            ),
        )?;

        Ok(db.query_row(
            "SELECT entry_requirement_id FROM entry_requirements WHERE course_id = ?",
            [course_id],
            |row| row.get(0),
        )?)
    }

    /// Adds a subject requirement; an existing row for the same subject gets the new grade
    pub fn upsert_subject_requirement(
        &self,
        entry_requirement_id: i64,
        subject: &str,
        grade: &str,
    ) -> Result<()> {
        let db = self.db.lock()?;
        db.execute(
            "INSERT INTO subject_requirements (entry_requirement_id, subject, grade)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(entry_requirement_id, subject) DO UPDATE SET grade = excluded.grade",
            (entry_requirement_id, subject, grade),
        )?;
        Ok(())
    }

    /// Gets the entry requirement for a course, if it has one
    pub fn get_entry_requirement(&self, course_id: i64) -> Result<Option<DbEntryRequirement>> {
        let db = self.db.lock()?;
        let requirement = db
            .query_row(
                "SELECT entry_requirement_id, course_id, min_ucas_points, min_grade_required,
                        display_grades, btec_grades, accepts_ucas, has_requirements
                 FROM entry_requirements WHERE course_id = ?",
                [course_id],
                |row| {
                    Ok(DbEntryRequirement {
                        entry_requirement_id: row.get(0)?,
                        course_id: row.get(1)?,
                        min_ucas_points: row.get(2)?,
                        min_grade_required: row.get(3)?,
                        display_grades: row.get(4)?,
                        btec_grades: row.get(5)?,
                        accepts_ucas: row.get(6)?,
                        has_requirements: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(requirement)
    }

    /// Gets all subject requirements of an entry requirement
    pub fn get_subject_requirements(
        &self,
        entry_requirement_id: i64,
    ) -> Result<Vec<DbSubjectRequirement>> {
        let db = self.db.lock()?;
        let mut stmt = db.prepare(
            "SELECT subject_requirement_id, entry_requirement_id, subject, grade
             FROM subject_requirements
             WHERE entry_requirement_id = ?
             ORDER BY subject_requirement_id",
        )?;

        let rows = stmt.query_map([entry_requirement_id], |row| {
            Ok(DbSubjectRequirement {
                subject_requirement_id: row.get(0)?,
                entry_requirement_id: row.get(1)?,
                subject: row.get(2)?,
                grade: row.get(3)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Runs a course query, returning courses joined with university and requirement
    pub fn query_courses(&self, query: &CourseQuery) -> Result<Vec<CourseRecord>> {
        let (tail, params) = query.to_sql();
        let sql = format!("{COURSE_SELECT}{tail}");

        let db = self.db.lock()?;
        let mut stmt = db.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), course_from_row)?;
        let courses = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(
            predicates = query.predicates().len(),
            rows = courses.len(),
            "Course query finished"
        );
        Ok(courses)
    }

    /// Total number of courses stored
    pub fn course_count(&self) -> Result<u64> {
        let db = self.db.lock()?;
        let count: i64 = db.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Checks whether some university is located exactly at `location` (case-insensitive)
    pub fn university_location_exists(&self, location: &str) -> Result<bool> {
        let db = self.db.lock()?;
        let count: i64 = db.query_row(
            &format!(
                "SELECT COUNT(*) FROM universities WHERE {}(TRIM(location)) = ?",
                query::FOLD_FN
            ),
            [location.trim().to_lowercase()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Gets universities whose name equals `name` (case-insensitive)
    pub fn universities_named(&self, name: &str) -> Result<Vec<DbUniversity>> {
        self.select_universities(
            &format!(
                "SELECT university_id, name, location, website, all_courses_url
                 FROM universities WHERE {}(name) = ? ORDER BY name",
                query::FOLD_FN
            ),
            name.trim().to_lowercase(),
        )
    }

    /// Gets universities whose name contains `fragment` (case-insensitive)
    pub fn universities_name_containing(&self, fragment: &str) -> Result<Vec<DbUniversity>> {
        self.select_universities(
            &format!(
                "SELECT university_id, name, location, website, all_courses_url
                 FROM universities WHERE {}(name) LIKE ? ESCAPE '\\' ORDER BY name",
                query::FOLD_FN
            ),
            query::like_pattern(fragment),
        )
    }

    fn select_universities(&self, sql: &str, param: String) -> Result<Vec<DbUniversity>> {
        let db = self.db.lock()?;
        let mut stmt = db.prepare(sql)?;
        let rows = stmt.query_map([param], |row| {
            Ok(DbUniversity {
                university_id: row.get(0)?,
                name: row.get(1)?,
                location: row.get(2)?,
                website: row.get(3)?,
                all_courses_url: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Inserts a saved match. Fails with a constraint violation if the user already saved it.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_saved_match(
        &self,
        user_id: i64,
        university: &str,
        course: &str,
        course_type: &str,
        duration: &str,
        requirements: &str,
        course_link: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<i64> {
        let db = self.db.lock()?;
        db.execute(
            "INSERT INTO saved_matches (
                user_id, university, course, course_type, duration,
                requirements, course_link, saved_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            (
                user_id,
                university,
                course,
                course_type,
                duration,
                requirements,
                course_link,
                saved_at,
            ),
        )?;
        Ok(db.last_insert_rowid())
    }

    /// Deletes a user's saved match; returns the number of rows removed
    pub fn delete_saved_match(
        &self,
        user_id: i64,
        university: &str,
        course: &str,
        course_link: &str,
    ) -> Result<usize> {
        let db = self.db.lock()?;
        Ok(db.execute(
            "DELETE FROM saved_matches
             WHERE user_id = ?1 AND university = ?2 AND course = ?3 AND course_link = ?4",
            (user_id, university, course, course_link),
        )?)
    }

    /// Gets all saved matches of a user, oldest first
    pub fn saved_matches_for_user(&self, user_id: i64) -> Result<Vec<DbSavedMatch>> {
        let db = self.db.lock()?;
        let mut stmt = db.prepare(
            "SELECT saved_match_id, user_id, university, course, course_type, duration,
                    requirements, course_link, saved_at
             FROM saved_matches
             WHERE user_id = ?
             ORDER BY saved_match_id",
        )?;

        let rows = stmt.query_map([user_id], |row| {
            Ok(DbSavedMatch {
                saved_match_id: row.get(0)?,
                user_id: row.get(1)?,
                university: row.get(2)?,
                course: row.get(3)?,
                course_type: row.get(4)?,
                duration: row.get(5)?,
                requirements: row.get(6)?,
                course_link: row.get(7)?,
                saved_at: row.get(8)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<CourseRecord> {
    let course_id: i64 = row.get(0)?;
    let requirement = match row.get::<_, Option<i64>>(11)? {
        Some(entry_requirement_id) => Some(DbEntryRequirement {
            entry_requirement_id,
            course_id,
            min_ucas_points: row.get(12)?,
            min_grade_required: row.get(13)?,
            display_grades: row.get(14)?,
            btec_grades: row.get(15)?,
            accepts_ucas: row.get(16)?,
            has_requirements: row.get(17)?,
        }),
        None => None,
    };

    Ok(CourseRecord {
        course_id,
        university_id: row.get(1)?,
        university_name: row.get(2)?,
        university_location: row.get(3)?,
        name: row.get(4)?,
        course_type: row.get(5)?,
        duration: row.get(6)?,
        mode: row.get(7)?,
        location: row.get(8)?,
        start_date: row.get(9)?,
        link: row.get(10)?,
        requirement,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::Seed;
    use super::*;

    fn names(rows: &[CourseRecord]) -> Vec<String> {
        rows.iter()
            .map(|r| format!("{} / {}", r.university_name, r.name))
            .collect()
    }

    #[test]
    fn test_upsert_university_is_keyed_by_name() {
        let db = CourseDbManager::open_in_memory().unwrap();
        let first = db
            .upsert_university(&NewUniversity {
                name: "University of Leeds".into(),
                location: "Leeds".into(),
                ..Default::default()
            })
            .unwrap();
        let second = db
            .upsert_university(&NewUniversity {
                name: "University of Leeds".into(),
                location: "Leeds, West Yorkshire".into(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(first, second);
        let unis = db.universities_named("university of leeds").unwrap();
        assert_eq!(unis.len(), 1);
        assert_eq!(unis[0].location, "Leeds, West Yorkshire");
    }

    #[test]
    fn test_entry_requirement_is_one_per_course() {
        let db = CourseDbManager::open_in_memory().unwrap();
        let course_id = Seed::new("Uni A", "Physics").points(120, "BBB").insert(&db);
        db.upsert_entry_requirement(
            course_id,
            &NewEntryRequirement {
                min_ucas_points: 136,
                display_grades: "AAB".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let req = db.get_entry_requirement(course_id).unwrap().unwrap();
        assert_eq!(req.min_ucas_points, 136);
        assert_eq!(req.display_grades, "AAB");
        assert!(db.get_entry_requirement(course_id + 100).unwrap().is_none());
    }

    #[test]
    fn test_subject_requirement_unique_per_subject() {
        let db = CourseDbManager::open_in_memory().unwrap();
        let course_id = Seed::new("Uni A", "Physics").points(120, "BBB").insert(&db);
        let req_id = db.get_entry_requirement(course_id).unwrap().unwrap().entry_requirement_id;

        db.upsert_subject_requirement(req_id, "Mathematics", "B").unwrap();
        db.upsert_subject_requirement(req_id, "Physics", "B").unwrap();
        db.upsert_subject_requirement(req_id, "Mathematics", "A").unwrap();

        let subjects = db.get_subject_requirements(req_id).unwrap();
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].subject, "Mathematics");
        assert_eq!(subjects[0].grade, "A");
    }

    #[test]
    fn test_qualifies_includes_courses_without_published_requirement() {
        let db = CourseDbManager::open_in_memory().unwrap();
        Seed::new("Uni A", "Easy").points(96, "CCC").insert(&db);
        Seed::new("Uni A", "Hard").points(160, "A*AA").insert(&db);
        Seed::new("Uni B", "Open Access").no_requirements(200).insert(&db);
        Seed::new("Uni C", "Unlisted").insert(&db);

        let rows = db
            .query_courses(
                &CourseQuery::new().filter(CoursePredicate::Qualifies { ucas_points: 104 }),
            )
            .unwrap();

        assert_eq!(
            names(&rows),
            vec!["Uni A / Easy", "Uni B / Open Access", "Uni C / Unlisted"]
        );
        assert!(rows[2].requirement.is_none());
    }

    #[test]
    fn test_min_required_points_is_inverse_filter() {
        let db = CourseDbManager::open_in_memory().unwrap();
        Seed::new("Uni A", "Easy").points(96, "CCC").insert(&db);
        Seed::new("Uni A", "Hard").points(160, "A*AA").insert(&db);
        Seed::new("Uni C", "Unlisted").insert(&db);

        let rows = db
            .query_courses(&CourseQuery::new().filter(CoursePredicate::MinRequiredPoints(120)))
            .unwrap();
        assert_eq!(names(&rows), vec!["Uni A / Hard"]);
    }

    #[test]
    fn test_duration_band_does_not_match_months_or_larger_numbers() {
        let db = CourseDbManager::open_in_memory().unwrap();
        Seed::new("Uni A", "Three").duration("3 years").insert(&db);
        Seed::new("Uni A", "Months").duration("3 months").insert(&db);
        Seed::new("Uni A", "Thirteen").duration("13 years").insert(&db);
        Seed::new("Uni A", "Six").duration("6 years full time").insert(&db);
        Seed::new("Uni A", "Four").duration("4 years").insert(&db);

        let three = db
            .query_courses(
                &CourseQuery::new().filter(CoursePredicate::Duration(DurationBand::Years(3))),
            )
            .unwrap();
        assert_eq!(names(&three), vec!["Uni A / Three"]);

        let long = db
            .query_courses(
                &CourseQuery::new().filter(CoursePredicate::Duration(DurationBand::FivePlusYears)),
            )
            .unwrap();
        assert_eq!(names(&long), vec!["Uni A / Six"]);
    }

    #[test]
    fn test_duration_band_matches_bracketed_and_slashed_forms() {
        let db = CourseDbManager::open_in_memory().unwrap();
        Seed::new("Uni A", "Bracketed").duration("Full-time (3 years)").insert(&db);
        Seed::new("Uni A", "Slashed").duration("Full-time/3 Years").insert(&db);
        Seed::new("Uni A", "Thirty").duration("Full-time (13 years)").insert(&db);

        let rows = db
            .query_courses(
                &CourseQuery::new().filter(CoursePredicate::Duration(DurationBand::Years(3))),
            )
            .unwrap();
        assert_eq!(names(&rows), vec!["Uni A / Bracketed", "Uni A / Slashed"]);
    }

    #[test]
    fn test_course_type_filter() {
        let db = CourseDbManager::open_in_memory().unwrap();
        Seed::new("Uni A", "History").course_type("BA (Hons)").insert(&db);
        Seed::new("Uni A", "Physics").insert(&db);
        Seed::new("Uni A", "Physics with Year Abroad")
            .course_type("MPhys")
            .insert(&db);

        let rows = db
            .query_courses(
                &CourseQuery::new().filter(CoursePredicate::CourseTypeContains("ba".into())),
            )
            .unwrap();
        assert_eq!(names(&rows), vec!["Uni A / History"]);
    }

    #[test]
    fn test_text_match_folds_non_ascii_case() {
        let db = CourseDbManager::open_in_memory().unwrap();
        Seed::new("Université de Genève", "Études Françaises")
            .at("GENÈVE")
            .insert(&db);

        for term in ["ÉTUDES", "études", "françaises"] {
            let rows = db
                .query_courses(
                    &CourseQuery::new().filter(CoursePredicate::TextMatchesAny(vec![term.into()])),
                )
                .unwrap();
            assert_eq!(rows.len(), 1, "{term}");
        }
        assert!(db.university_location_exists("genève").unwrap());
        assert_eq!(db.universities_named("UNIVERSITÉ DE GENÈVE").unwrap().len(), 1);
        assert_eq!(db.universities_name_containing("GENÈVE").unwrap().len(), 1);
    }

    #[test]
    fn test_text_match_covers_name_university_and_location() {
        let db = CourseDbManager::open_in_memory().unwrap();
        Seed::new("University of Bath", "History").at("Bath").insert(&db);
        Seed::new("Bristol Uni", "Bath Studies").at("Bristol").insert(&db);
        Seed::new("Uni of Somewhere", "Chemistry").at("Bath Spa").insert(&db);
        Seed::new("Cardiff Uni", "Law").at("Cardiff").insert(&db);

        let rows = db
            .query_courses(
                &CourseQuery::new().filter(CoursePredicate::TextMatchesAny(vec!["bath".into()])),
            )
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.university_name != "Cardiff Uni"));
    }

    #[test]
    fn test_location_matches_course_or_university_location() {
        let db = CourseDbManager::open_in_memory().unwrap();
        Seed::new("Uni A", "History").at("Leeds").insert(&db);
        Seed::new("Uni B", "Law").at("Cardiff").insert(&db);

        let rows = db
            .query_courses(&CourseQuery::new().filter(CoursePredicate::Location {
                cities: vec!["Leeds".into(), "York".into()],
                literal: "North".into(),
            }))
            .unwrap();
        assert_eq!(names(&rows), vec!["Uni A / History"]);
    }

    #[test]
    fn test_limit_and_ordering() {
        let db = CourseDbManager::open_in_memory().unwrap();
        Seed::new("Zeta", "Art").insert(&db);
        Seed::new("Alpha", "Zoology").insert(&db);
        Seed::new("Alpha", "Biology").insert(&db);

        let rows = db.query_courses(&CourseQuery::new().limit(2)).unwrap();
        assert_eq!(names(&rows), vec!["Alpha / Biology", "Alpha / Zoology"]);
        assert_eq!(db.course_count().unwrap(), 3);
    }

    #[test]
    fn test_university_lookups() {
        let db = CourseDbManager::open_in_memory().unwrap();
        Seed::new("University of Leeds", "History").at("Leeds").insert(&db);
        Seed::new("Leeds Beckett University", "Law").at("Leeds").insert(&db);

        assert!(db.university_location_exists(" leeds ").unwrap());
        assert!(!db.university_location_exists("Lee").unwrap());
        assert_eq!(db.universities_name_containing("leeds").unwrap().len(), 2);
        assert_eq!(db.universities_name_containing("beckett").unwrap().len(), 1);
        assert!(db.universities_named("Leeds").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_saved_match_is_a_constraint_violation() {
        let db = CourseDbManager::open_in_memory().unwrap();
        let now = Utc::now();
        db.insert_saved_match(1, "Uni A", "Physics", "BSc", "3 years", "AAB", "https://a", now)
            .unwrap();
        let err = db
            .insert_saved_match(1, "Uni A", "Physics", "BSc", "3 years", "AAB", "https://a", now)
            .unwrap_err();
        assert!(err.is_constraint_violation());

        // Another user may save the same course
        db.insert_saved_match(2, "Uni A", "Physics", "BSc", "3 years", "AAB", "https://a", now)
            .unwrap();
        assert_eq!(db.saved_matches_for_user(1).unwrap().len(), 1);
        assert_eq!(db.delete_saved_match(1, "Uni A", "Physics", "https://a").unwrap(), 1);
        assert_eq!(db.delete_saved_match(1, "Uni A", "Physics", "https://a").unwrap(), 0);
        assert_eq!(db.saved_matches_for_user(2).unwrap().len(), 1);
    }
}
