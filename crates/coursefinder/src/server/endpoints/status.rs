use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// GET /health
/// Reports whether the course database is reachable and how many courses it holds
pub async fn get_health(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /health");

    match s.db.course_count() {
        Ok(courses) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "courses": courses,
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            ApiErrorType::from((
                StatusCode::SERVICE_UNAVAILABLE,
                "Course database unavailable",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::Seed;
    use crate::db::CourseDbManager;

    #[tokio::test]
    async fn test_health_counts_courses() {
        let db = CourseDbManager::open_in_memory().unwrap();
        Seed::new("University of Kent", "Law").insert(&db);
        let state = Arc::new(AppState::new(db, 50));

        let response = get_health(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["courses"], 1);
    }
}
