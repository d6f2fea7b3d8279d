//! Free-text understanding: grades, interests and search-term synonyms.

mod grade_parser;
mod interests;
mod synonyms;
mod types;
mod vocabulary;

pub use grade_parser::{normalize_grade, GradeParser};
pub use interests::{merge_interests, parse_interests};
pub use synonyms::expand_query_with_synonyms;
pub use types::{ParsedGrades, ParsedQuery};
