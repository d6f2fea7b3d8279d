use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::server::endpoints::{saved, search, status};
use crate::types::AppState;

mod endpoints;
mod types;
mod util;

pub use util::VIEWER_HEADER;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let search_router = Router::new()
        .route("/matches", post(search::post_matches))
        .route("/search", post(search::post_search))
        .route("/options", get(search::get_options));

    // Bookmarks of the viewer named by the x-user-id header
    let saved_router = Router::new().route(
        "/saved",
        get(saved::get_saved)
            .post(saved::post_saved)
            .delete(saved::delete_saved),
    );

    Router::new()
        .route("/health", get(status::get_health))
        .merge(search_router)
        .merge(saved_router)
        .with_state(app_state)
}
