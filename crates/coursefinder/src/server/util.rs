use axum::http::{HeaderMap, StatusCode};
use rand::Rng;

use crate::saved::UserId;
use crate::server::types::ApiErrorType;

/// Header carrying the signed-in viewer's id, set by the session layer in front of us
pub const VIEWER_HEADER: &str = "x-user-id";

/// Reads the viewer from the request headers; `None` for anonymous requests.
pub fn viewer_from_headers(headers: &HeaderMap) -> Result<Option<UserId>, ApiErrorType> {
    let Some(value) = headers.get(VIEWER_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|id| Some(UserId(id)))
        .ok_or_else(|| {
            ApiErrorType::from((
                StatusCode::BAD_REQUEST,
                "Invalid viewer id",
                Some(format!("{VIEWER_HEADER} must be an integer")),
            ))
        })
}

/// Like [`viewer_from_headers`], but anonymous requests are rejected.
pub fn require_viewer(headers: &HeaderMap) -> Result<UserId, ApiErrorType> {
    viewer_from_headers(headers)?.ok_or_else(|| {
        ApiErrorType::from((
            StatusCode::UNAUTHORIZED,
            "Sign in to manage saved matches",
            None,
        ))
    })
}

/// Generates a short id to tie together the log lines of one request.
pub fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}
