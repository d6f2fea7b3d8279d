use crate::db::CourseDbManager;

/// State shared by every request handler.
pub struct AppState {
    /// Course and saved-match storage
    pub db: CourseDbManager,
    /// Results per page in the search responses
    pub page_size: usize,
}

impl AppState {
    pub fn new(db: CourseDbManager, page_size: usize) -> Self {
        Self {
            db,
            page_size: page_size.max(1),
        }
    }
}
