//! Handlers for staff data submissions.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use staffdata_core::submission::{validate_payload, SubmissionPayload};
use staffdata_db::repositories::SubmissionRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

pub const MSG_CREATED: &str = "Data created successfully";

/// POST /create
///
/// Validate the payload against the required-field policy and persist it.
/// Malformed JSON is reported with the same error envelope as a validation
/// failure.
pub async fn create_submission(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload?;

    let input = validate_payload(payload).inspect_err(|e| {
        tracing::info!(error = %e, "Rejected submission");
    })?;
    let submission = SubmissionRepo::create(&state.pool, &input).await?;

    tracing::info!(
        submission_id = submission.id,
        department = %submission.fields.department,
        experience_entries = submission.fields.experience_list.len(),
        "Submission created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(MSG_CREATED, submission)),
    ))
}

/// GET /get-data
///
/// Every stored submission, unsorted. Filtering and ordering happen on the
/// dashboard side.
pub async fn list_submissions(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let submissions = SubmissionRepo::list_all(&state.pool).await?;

    tracing::debug!(count = submissions.len(), "Listed submissions");

    Ok(Json(DataResponse::ok(submissions)))
}
