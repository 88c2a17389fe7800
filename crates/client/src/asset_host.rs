//! External asset host used to store uploaded CVs.
//!
//! The upload runs out-of-band from the form submission: the returned
//! reference URL is what ends up in the submission's `cvFile` field.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use staffdata_core::upload::{SelectedFile, UploadSlot, UploadTicket, UPLOAD_FAILED_MESSAGE};
use staffdata_core::validation::RuleViolation;

use crate::config::ClientConfig;
use crate::error::{ensure_success, ClientError};

/// Somewhere a selected file can be pushed to, yielding a public URL.
#[async_trait]
pub trait AssetHost: Send + Sync {
    /// Upload `file` and return its reference URL.
    async fn upload(&self, file: &SelectedFile) -> Result<String, ClientError>;
}

// ---------------------------------------------------------------------------
// Cloudinary
// ---------------------------------------------------------------------------

/// Unsigned raw uploads to a Cloudinary account.
pub struct CloudinaryHost {
    client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    upload_preset: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

impl CloudinaryHost {
    pub fn new(
        base_url: impl Into<String>,
        cloud_name: impl Into<String>,
        upload_preset: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
        }
    }

    /// Build a host from client configuration. Fails when no cloud name is set.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let cloud_name = config.cloud_name.clone().ok_or_else(|| {
            ClientError::Config("CLOUDINARY_CLOUD_NAME must be set to upload files".into())
        })?;
        Ok(Self::new(
            config.asset_host_base.clone(),
            cloud_name,
            config.upload_preset.clone(),
        ))
    }

    fn upload_url(&self) -> String {
        format!("{}/{}/raw/upload", self.base_url, self.cloud_name)
    }
}

#[async_trait]
impl AssetHost for CloudinaryHost {
    async fn upload(&self, file: &SelectedFile) -> Result<String, ClientError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("cloud_name", self.cloud_name.clone());

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = ensure_success(response).await?.json().await?;

        let url = body
            .secure_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                ClientError::UnexpectedResponse("upload response has no secure_url".into())
            })?;

        tracing::info!(file = %file.name, size = file.size(), "CV uploaded");
        Ok(url)
    }
}

// ---------------------------------------------------------------------------
// Ticketed upload
// ---------------------------------------------------------------------------

/// An upload that has been accepted by the slot but not yet performed.
///
/// Produced by [`begin_upload`]; run it with [`PendingUpload::run`] and hand
/// the result back to the slot with [`CompletedUpload::apply`]. Dropping a
/// pending upload abandons it.
#[derive(Debug)]
pub struct PendingUpload {
    ticket: UploadTicket,
    file: SelectedFile,
}

/// The outcome of a [`PendingUpload`], still tied to its ticket.
#[derive(Debug)]
pub struct CompletedUpload {
    ticket: UploadTicket,
    outcome: Result<String, String>,
}

/// Check `file` against the slot and, if it passes, issue an upload ticket.
pub fn begin_upload(
    slot: &mut UploadSlot,
    file: SelectedFile,
) -> Result<PendingUpload, RuleViolation> {
    let ticket = slot.select(&file)?;
    Ok(PendingUpload { ticket, file })
}

impl PendingUpload {
    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    /// Perform the transfer. Host errors are logged and reduced to the
    /// user-facing failure message.
    pub async fn run(self, host: &dyn AssetHost) -> CompletedUpload {
        let outcome = host.upload(&self.file).await.map_err(|e| {
            tracing::error!(file = %self.file.name, error = %e, "CV upload failed");
            UPLOAD_FAILED_MESSAGE.to_string()
        });
        CompletedUpload {
            ticket: self.ticket,
            outcome,
        }
    }
}

impl CompletedUpload {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Store the outcome in `slot`. Returns `false` when the slot has moved
    /// on (file removed or replaced) and the outcome was discarded.
    pub fn apply(self, slot: &mut UploadSlot) -> bool {
        let applied = slot.complete(self.ticket, self.outcome);
        if !applied {
            tracing::debug!("Discarded stale upload result");
        }
        applied
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
