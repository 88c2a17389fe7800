//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server or
//! database is needed.

use axum::response::IntoResponse;
use http_body_util::BodyExt;
use staffdata_api::error::AppError;
use staffdata_core::error::{CoreError, FieldErrors};

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (axum::http::StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "submission",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["message"], "submission with id 42 not found");
}

#[tokio::test]
async fn field_errors_are_rendered_as_map() {
    let mut errors = FieldErrors::new();
    errors.insert("name", "name is required");
    errors.insert("cvFile", "cvFile is required");
    let err = AppError::Core(CoreError::InvalidFields {
        message: "All required fields must be provided".into(),
        errors,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "All required fields must be provided");
    assert_eq!(json["errors"]["name"], "name is required");
    assert_eq!(json["errors"]["cvFile"], "cvFile is required");
}

#[tokio::test]
async fn plain_validation_has_no_errors_map() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Validation("bad label".into()))).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json.get("errors").is_none());
}

#[tokio::test]
async fn database_error_detail_is_not_leaked() {
    let err = AppError::Database(sqlx::Error::Protocol(
        "connection string leaked".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["message"], "An internal error occurred");
    assert!(!json.to_string().contains("leaked"));
}

#[tokio::test]
async fn pool_errors_map_to_500() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::PoolTimedOut)).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
}
