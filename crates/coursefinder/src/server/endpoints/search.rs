//! Search endpoints: grade matching, text search and the filter choices.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::saved::{mark_saved, UserId};
use crate::search::{
    search_by_grades, search_by_text, text_status_message, FilterOptions, Page, PageInfo,
    SearchFilters, UniMatchResult,
};
use crate::server::types::ApiErrorType;
use crate::server::util::{generate_correlation_id, viewer_from_headers};
use crate::types::AppState;

/// Body of `POST /matches` and `POST /search`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: String,
    /// Page number, as a string or a number
    pub page: Option<Value>,
    pub filters: SearchFilters,
}

impl SearchRequest {
    fn page_param(&self) -> Option<String> {
        match &self.page {
            Some(Value::String(page)) => Some(page.clone()),
            Some(Value::Number(page)) => Some(page.to_string()),
            _ => None,
        }
    }
}

/// POST /matches
///
/// Parses grades and interests out of `query` and returns the qualifying courses.
pub async fn post_matches(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SearchRequest>,
) -> Response {
    let correlation_id = generate_correlation_id();
    info!(correlation_id = %correlation_id, query = %req.query, "POST /matches");

    let viewer = match viewer_from_headers(&headers) {
        Ok(viewer) => viewer,
        Err(e) => return e.into_response(),
    };
    if req.query.trim().is_empty() {
        return empty_search_response();
    }

    let outcome = match search_by_grades(&s.db, &req.query, &req.filters) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(correlation_id = %correlation_id, error = %e, "Grade search failed");
            return ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to search courses",
                Some(e.to_string()),
            ))
            .into_response();
        }
    };

    let page = Page::paginate(
        outcome.matching_courses.clone(),
        req.page_param().as_deref(),
        s.page_size,
    );
    let message = outcome.status_message(page.end_index());

    match annotate(&s, page, viewer) {
        Ok((info, results)) => (
            StatusCode::OK,
            Json(json!({
                "message": message,
                "query": outcome.query,
                "grades": outcome.parsed_grades,
                "interests": outcome.interests,
                "ucas_points": outcome.ucas_points,
                "page": info,
                "results": results,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(correlation_id = %correlation_id, error = ?e, "Failed to mark saved matches");
            e.into_response()
        }
    }
}

/// POST /search
///
/// Plain text search over course names, university names and locations.
pub async fn post_search(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SearchRequest>,
) -> Response {
    let correlation_id = generate_correlation_id();
    info!(correlation_id = %correlation_id, query = %req.query, "POST /search");

    let viewer = match viewer_from_headers(&headers) {
        Ok(viewer) => viewer,
        Err(e) => return e.into_response(),
    };
    if req.query.trim().is_empty() {
        return empty_search_response();
    }

    let results = match search_by_text(&s.db, &req.query, &req.filters) {
        Ok(results) => results,
        Err(e) => {
            error!(correlation_id = %correlation_id, error = %e, "Text search failed");
            return ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to search courses",
                Some(e.to_string()),
            ))
            .into_response();
        }
    };

    let total = results.len();
    let page = Page::paginate(results, req.page_param().as_deref(), s.page_size);
    let message = text_status_message(&req.query, total, page.end_index());

    match annotate(&s, page, viewer) {
        Ok((info, results)) => (
            StatusCode::OK,
            Json(json!({
                "message": message,
                "query": req.query,
                "page": info,
                "results": results,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(correlation_id = %correlation_id, error = ?e, "Failed to mark saved matches");
            e.into_response()
        }
    }
}

/// GET /options
///
/// Returns the choices offered by the search filters.
pub async fn get_options() -> Response {
    (StatusCode::OK, Json(FilterOptions::standard())).into_response()
}

/// Marks the viewer's saved matches on one page of results.
fn annotate(
    s: &AppState,
    page: Page<UniMatchResult>,
    viewer: Option<UserId>,
) -> Result<(PageInfo, Vec<UniMatchResult>), ApiErrorType> {
    let info = page.info();
    let results = mark_saved(&s.db, page.items, viewer).map_err(|e| {
        ApiErrorType::from((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load saved matches",
            Some(e.to_string()),
        ))
    })?;
    Ok((info, results))
}

fn empty_search_response() -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "message": "",
            "results": [],
        })),
    )
        .into_response()
}
