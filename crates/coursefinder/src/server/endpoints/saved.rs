//! Saved-match endpoints. All of them need a signed-in viewer.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::saved::{list_saved, save_match, unsave_match, SaveOutcome};
use crate::search::UniMatchResult;
use crate::server::types::ApiErrorType;
use crate::server::util::require_viewer;
use crate::types::AppState;

/// GET /saved
pub async fn get_saved(State(s): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let user = match require_viewer(&headers) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };
    info!("GET /saved for user {}", user);

    match list_saved(&s.db, user) {
        Ok(saved) => (StatusCode::OK, Json(json!({ "results": saved }))).into_response(),
        Err(e) => {
            error!("Failed to list saved matches for {}: {}", user, e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list saved matches",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

/// POST /saved
///
/// Saves the posted result. Saving an already saved match is not an error.
pub async fn post_saved(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(result): Json<UniMatchResult>,
) -> Response {
    let user = match require_viewer(&headers) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };
    info!("POST /saved for user {}: {} / {}", user, result.university, result.course);

    match save_match(&s.db, user, &result) {
        Ok(outcome) => {
            let status = match outcome {
                SaveOutcome::Saved => StatusCode::CREATED,
                SaveOutcome::AlreadySaved => StatusCode::OK,
            };
            (status, Json(json!({ "status": outcome }))).into_response()
        }
        Err(e) => {
            error!("Failed to save match for {}: {}", user, e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save match",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

/// DELETE /saved
///
/// Removes the saved match with the posted university, course and link.
pub async fn delete_saved(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(result): Json<UniMatchResult>,
) -> Response {
    let user = match require_viewer(&headers) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };
    info!("DELETE /saved for user {}: {} / {}", user, result.university, result.course);

    match unsave_match(&s.db, user, &result) {
        Ok(removed) => (StatusCode::OK, Json(json!({ "removed": removed }))).into_response(),
        Err(e) => {
            error!("Failed to remove saved match for {}: {}", user, e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to remove saved match",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}
