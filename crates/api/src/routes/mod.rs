pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::submissions;
use crate::state::AppState;

/// Submission routes.
///
/// Mounted twice, at the root and under `/api/v1`, so both deployed
/// frontends reach the same handlers.
///
/// ```text
/// POST /create       -> create_submission
/// GET  /get-data     -> list_submissions
/// ```
pub fn data_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(submissions::create_submission))
        .route("/get-data", get(submissions::list_submissions))
}

/// Build the `/api/v1` route tree.
pub fn api_routes() -> Router<AppState> {
    data_routes()
}
