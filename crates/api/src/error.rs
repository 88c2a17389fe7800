//! HTTP error mapping.
//!
//! Every failure leaves the server as
//! `{"success": false, "message": ..., "code": ...}`, plus an `errors` map
//! when individual fields were rejected.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use staffdata_core::error::{CoreError, FieldErrors};

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// PostgreSQL SQLSTATE for `check_violation`.
const PG_CHECK_VIOLATION: &str = "23514";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request could not be read (malformed JSON, wrong content type).
    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    message: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a FieldErrors>,
}

/// Status, code and caller-facing message of one error.
struct Rendered {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl Rendered {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            INTERNAL_MESSAGE,
        )
    }
}

impl AppError {
    fn render(&self) -> Rendered {
        match self {
            AppError::Core(CoreError::NotFound { entity, id }) => Rendered::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            AppError::Core(CoreError::Validation(msg)) => {
                Rendered::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.as_str())
            }
            AppError::Core(CoreError::InvalidFields { message, .. }) => {
                Rendered::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.as_str())
            }
            AppError::Core(CoreError::Conflict(msg)) => {
                Rendered::new(StatusCode::CONFLICT, "CONFLICT", msg.as_str())
            }
            AppError::Database(err) => render_sqlx_error(err),
            AppError::BadRequest(msg) => {
                Rendered::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.as_str())
            }
        }
    }

    fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Core(CoreError::InvalidFields { errors, .. }) => Some(errors),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let rendered = self.render();
        let body = ErrorBody {
            success: false,
            message: rendered.message,
            code: rendered.code,
            errors: self.field_errors(),
        };
        (rendered.status, Json(body)).into_response()
    }
}

/// A missing row is 404. A CHECK constraint failure means a payload got past
/// validation and is reported as 400. Anything else is a sanitized 500.
fn render_sqlx_error(err: &sqlx::Error) -> Rendered {
    if let sqlx::Error::RowNotFound = err {
        return Rendered::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found");
    }

    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some(PG_CHECK_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            tracing::warn!(constraint, "Check constraint rejected submission");
            return Rendered::new(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Submission violates constraint: {constraint}"),
            );
        }
    }

    tracing::error!(error = %err, "Database error");
    Rendered::internal()
}
