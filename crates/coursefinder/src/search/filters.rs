//! User-selected search filters, shared by the match and text searches.

use super::regions::{cities_for_region, region_names};
use crate::db::{CoursePredicate, DurationBand};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

pub const COURSE_TYPE_OPTIONS: &[&str] = &[
    "BA (Hons)",
    "BSc (Hons)",
    "BEng (Hon)",
    "LLB (Hons)",
    "MA",
    "MSc",
    "MBA",
    "MEng",
    "Foundation",
];

pub const DURATION_OPTIONS: &[&str] = &["1 Year", "2 Years", "3 Years", "4 Years", "5+ Years"];

pub const MODE_OPTIONS: &[&str] = &["Full-time", "Part-time", "Sandwich", "Distance Learning"];

pub const UCAS_OPTIONS: &[(u32, &str)] = &[
    (48, "48+ (Pass/PPP)"),
    (80, "80+ (BCC/BBC)"),
    (96, "96+ (CCC/BCC)"),
    (104, "104+ (BCC/CDD)"),
    (112, "112+ (BBC)"),
    (120, "120+ (BBB)"),
    (128, "128+ (ABB)"),
    (136, "136+ (AAB)"),
    (144, "144+ (AAA)"),
    (168, "168+ (A*A*A*)"),
];

/// Filters selected on the search forms. Blank values mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub course_type: Option<String>,
    /// "N Years" or "5+ Years"
    pub duration: Option<String>,
    pub mode: Option<String>,
    /// A region name, or any other text matched against locations literally
    pub location: Option<String>,
    /// Minimum UCAS points a course must ask for
    #[serde(deserialize_with = "string_or_number")]
    pub ucas_range: Option<String>,
    /// Only courses with published grade requirements
    pub only_grades: bool,
    /// Only courses without published requirements
    pub no_requirements: bool,
}

impl SearchFilters {
    /// Translates the filters into predicates that are AND-ed onto a search.
    ///
    /// Values that cannot be interpreted (a non-numeric UCAS minimum, a duration
    /// without a leading number) are skipped. When both requirement checkboxes are
    /// ticked `only_grades` wins.
    pub fn to_predicates(&self) -> Vec<CoursePredicate> {
        let mut predicates = Vec::new();

        if let Some(min_points) = non_blank(&self.ucas_range) {
            match min_points.parse::<u32>() {
                Ok(0) => {}
                Ok(points) => predicates.push(CoursePredicate::MinRequiredPoints(points)),
                Err(_) => warn!(ucas_range = min_points, "Ignoring non-numeric UCAS filter"),
            }
        }

        if let Some(course_type) = non_blank(&self.course_type) {
            predicates.push(CoursePredicate::CourseTypeContains(course_type.to_string()));
        }

        if let Some(duration) = non_blank(&self.duration) {
            match parse_duration(duration) {
                Some(band) => predicates.push(CoursePredicate::Duration(band)),
                None => warn!(duration, "Ignoring duration filter without a year count"),
            }
        }

        if let Some(mode) = non_blank(&self.mode) {
            predicates.push(CoursePredicate::ModeContains(mode.to_string()));
        }

        if let Some(location) = non_blank(&self.location) {
            predicates.push(CoursePredicate::Location {
                cities: cities_for_region(location)
                    .iter()
                    .map(|city| city.to_string())
                    .collect(),
                literal: location.to_string(),
            });
        }

        if self.only_grades {
            if self.no_requirements {
                debug!("Both requirement filters set, keeping only_grades");
            }
            predicates.push(CoursePredicate::HasPublishedGrades);
        } else if self.no_requirements {
            predicates.push(CoursePredicate::NoPublishedRequirements);
        }

        predicates
    }
}

/// Reads "5+ Years" as five or more years and "3 Years" as exactly three.
pub fn parse_duration(selected: &str) -> Option<DurationBand> {
    if selected.contains("5+") {
        return Some(DurationBand::FivePlusYears);
    }
    selected
        .split_whitespace()
        .next()
        .and_then(|years| years.parse().ok())
        .map(DurationBand::Years)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Accepts the UCAS minimum either as a form string or as a JSON number.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    }))
}

/// Choices offered by the search forms.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub course_types: &'static [&'static str],
    pub durations: &'static [&'static str],
    pub modes: &'static [&'static str],
    pub locations: Vec<&'static str>,
    pub ucas_options: Vec<UcasOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UcasOption {
    pub value: u32,
    pub label: &'static str,
}

impl FilterOptions {
    pub fn standard() -> Self {
        Self {
            course_types: COURSE_TYPE_OPTIONS,
            durations: DURATION_OPTIONS,
            modes: MODE_OPTIONS,
            locations: region_names(),
            ucas_options: UCAS_OPTIONS
                .iter()
                .map(|&(value, label)| UcasOption { value, label })
                .collect(),
        }
    }
}
