//! Display formatting for results and status lines.

use crate::db::DbEntryRequirement;

pub const NO_REQUIREMENTS_TEXT: &str = "No specific requirements";

/// Summarizes an entry requirement for display.
///
/// Published display grades are preferred, then a points minimum. BTEC
/// grades are appended after " / ". A course without a requirement record,
/// or one flagged as having none, shows [`NO_REQUIREMENTS_TEXT`].
pub fn requirements_text(requirement: Option<&DbEntryRequirement>) -> String {
    let Some(req) = requirement.filter(|r| r.has_requirements) else {
        return NO_REQUIREMENTS_TEXT.to_string();
    };

    let mut text = if !req.display_grades.trim().is_empty() {
        req.display_grades.clone()
    } else if req.min_ucas_points > 0 {
        format!("{} UCAS points", req.min_ucas_points)
    } else {
        NO_REQUIREMENTS_TEXT.to_string()
    };

    if !req.btec_grades.is_empty() {
        text.push_str(" / ");
        text.push_str(&req.btec_grades);
    }
    text
}

/// Upper-cases the first letter of every word and lower-cases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement() -> DbEntryRequirement {
        DbEntryRequirement {
            entry_requirement_id: 1,
            course_id: 1,
            min_ucas_points: 0,
            min_grade_required: String::new(),
            display_grades: String::new(),
            btec_grades: String::new(),
            accepts_ucas: true,
            has_requirements: true,
        }
    }

    #[test]
    fn test_display_grades_preferred() {
        let req = DbEntryRequirement {
            display_grades: "AAB".into(),
            min_ucas_points: 136,
            btec_grades: "DDD".into(),
            ..requirement()
        };
        assert_eq!(requirements_text(Some(&req)), "AAB / DDD");
    }

    #[test]
    fn test_points_fallback() {
        let req = DbEntryRequirement {
            display_grades: "   ".into(),
            min_ucas_points: 112,
            ..requirement()
        };
        assert_eq!(requirements_text(Some(&req)), "112 UCAS points");
    }

    #[test]
    fn test_no_requirements() {
        assert_eq!(requirements_text(None), NO_REQUIREMENTS_TEXT);
        assert_eq!(requirements_text(Some(&requirement())), NO_REQUIREMENTS_TEXT);

        let waived = DbEntryRequirement {
            display_grades: "AAA".into(),
            btec_grades: "D*D*D*".into(),
            has_requirements: false,
            ..requirement()
        };
        assert_eq!(requirements_text(Some(&waived)), NO_REQUIREMENTS_TEXT);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("further mathematics"), "Further Mathematics");
        assert_eq!(title_case("art and design"), "Art And Design");
        assert_eq!(title_case("COMPUTER science"), "Computer Science");
    }
}
