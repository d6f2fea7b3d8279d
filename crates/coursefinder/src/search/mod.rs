//! Course searches: the grade-based matcher and the plain text search.

mod filters;
mod format;
mod matches;
mod pagination;
mod regions;
mod text;
mod types;
mod ucas;

pub use filters::{parse_duration, FilterOptions, SearchFilters, UcasOption};
pub use format::{requirements_text, title_case, NO_REQUIREMENTS_TEXT};
pub use matches::{search_by_grades, MatchSearchOutcome, MATCH_RESULT_LIMIT};
pub use pagination::{Page, PageInfo, DEFAULT_PAGE_SIZE};
pub use regions::{cities_for_region, is_listed_city, LOCATION_REGIONS};
pub use text::{search_by_text, text_status_message, TEXT_RESULT_LIMIT};
pub use types::UniMatchResult;
pub use ucas::{calculate_ucas_points, grade_points};
