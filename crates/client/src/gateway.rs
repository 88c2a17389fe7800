//! HTTP gateway to the staff data API: create and list submissions.

use reqwest::StatusCode;
use serde::Deserialize;
use staffdata_core::error::FieldErrors;
use staffdata_core::submission::{Submission, SubmissionPayload};

use crate::error::{ensure_success, ClientError};

pub const MSG_SUBMITTED: &str = "Form submitted successfully!";
pub const MSG_NETWORK_ERROR: &str = "Network error. Please check your connection and try again.";
pub const MSG_SERVER_ERROR: &str = "Server error. Please try again later.";
pub const MSG_SUBMIT_FAILED: &str = "Submission failed. Please try again.";

/// Path of the list endpoint on the versioned API, tried first.
const LIST_PATH: &str = "/api/v1/get-data";
/// Unversioned list path, tried once if the versioned one fails.
const LIST_FALLBACK_PATH: &str = "/get-data";
const CREATE_PATH: &str = "/create";

/// The result of one submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The server stored the submission.
    Created {
        message: String,
        submission: Box<Submission>,
    },
    /// The server answered with a non-success status.
    Rejected {
        status: u16,
        message: String,
        errors: FieldErrors,
    },
    /// No response was received.
    NetworkFailure { message: String },
}

impl SubmitOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }

    /// The message to show the user. Field errors are appended to the
    /// server's summary so nothing the server said is lost.
    pub fn display_message(&self) -> String {
        match self {
            Self::Created { .. } => MSG_SUBMITTED.to_string(),
            Self::Rejected {
                message, errors, ..
            } if !errors.is_empty() => format!("{message}: {errors}"),
            Self::Rejected { message, .. } => message.clone(),
            Self::NetworkFailure { .. } => MSG_NETWORK_ERROR.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedBody {
    #[serde(default)]
    message: Option<String>,
    data: Submission,
}

#[derive(Debug, Deserialize)]
struct ListBody {
    data: Vec<Submission>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: FieldErrors,
}

/// Client for the submission endpoints of one API deployment.
#[derive(Debug, Clone)]
pub struct SubmissionGateway {
    client: reqwest::Client,
    api_url: String,
}

impl SubmissionGateway {
    /// * `api_url` - Base HTTP URL, e.g. `http://localhost:8000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Post one assembled payload. Never retries.
    pub async fn submit(&self, payload: &SubmissionPayload) -> SubmitOutcome {
        let response = match self
            .client
            .post(format!("{}{CREATE_PATH}", self.api_url))
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Submission request failed");
                return SubmitOutcome::NetworkFailure {
                    message: e.to_string(),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<CreatedBody>().await {
                Ok(body) => {
                    tracing::info!(submission_id = body.data.id, "Submission accepted");
                    SubmitOutcome::Created {
                        message: body.message.unwrap_or_else(|| MSG_SUBMITTED.to_string()),
                        submission: Box::new(body.data),
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Unreadable create response");
                    SubmitOutcome::Rejected {
                        status: status.as_u16(),
                        message: MSG_SUBMIT_FAILED.to_string(),
                        errors: FieldErrors::new(),
                    }
                }
            };
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        let message = body.message.unwrap_or_else(|| {
            if status.is_server_error() {
                MSG_SERVER_ERROR.to_string()
            } else {
                MSG_SUBMIT_FAILED.to_string()
            }
        });
        tracing::warn!(status = status.as_u16(), message = %message, "Submission rejected");

        SubmitOutcome::Rejected {
            status: status.as_u16(),
            message,
            errors: body.errors,
        }
    }

    /// Fetch every submission. The versioned path is tried first and the
    /// unversioned one exactly once if that fails.
    pub async fn list_submissions(&self) -> Result<Vec<Submission>, ClientError> {
        match self.fetch_list(LIST_PATH).await {
            Ok(list) => Ok(list),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = LIST_PATH,
                    "List fetch failed, trying fallback path",
                );
                self.fetch_list(LIST_FALLBACK_PATH).await
            }
        }
    }

    async fn fetch_list(&self, path: &str) -> Result<Vec<Submission>, ClientError> {
        let response = self
            .client
            .get(format!("{}{path}", self.api_url))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let body: ListBody = response.json().await?;
        Ok(body.data)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
