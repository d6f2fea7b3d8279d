//! University course finder: matches students to courses from free-text
//! grade and interest statements, with filtered text search and saved matches.

pub mod config;
pub mod db;
pub mod error;
pub mod nlp;
pub mod saved;
pub mod search;
pub mod server;
pub mod types;

pub use error::{CourseFinderError, Result};
