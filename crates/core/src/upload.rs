//! CV upload slot state machine.
//!
//! The CV is pushed to an external asset host out-of-band from the form
//! submission. [`UploadSlot`] tracks the locally selected file, the upload
//! status and the reference URL returned by the host. The actual transfer is
//! performed by the caller; this module only decides which results are
//! accepted and what the draft looks like afterwards.
//!
//! ```text
//!            select             complete(Ok)
//!   Idle ──────────▶ Uploading ─────────────▶ Uploaded
//!    ▲                  │   ▲                    │
//!    │     complete(Err)│   │ select             │ select
//!    │                  ▼   │                    │
//!    └──── remove ──── Failed ◀──────────────────┘ (via Uploading)
//! ```
//!
//! `remove` returns to `Idle` from any state.

use std::fmt;

use serde::Serialize;

use crate::validation::{check_file, RuleViolation};

/// Message surfaced when the asset host rejects or fails an upload.
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload file. Please try again.";

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// A file chosen by the user, with its raw bytes.
#[derive(Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn meta(&self) -> FileMeta {
        FileMeta {
            name: self.name.clone(),
            size: self.size(),
        }
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.size())
            .finish()
    }
}

/// Name and size of the locally selected file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Idle,
    Uploading,
    Uploaded,
    Failed,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Uploading => "uploading",
            Self::Uploaded => "uploaded",
            Self::Failed => "failed",
        }
    }
}

/// Identifies one upload attempt. Completions carrying an outdated ticket
/// are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket(u64);

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSlot {
    status: UploadStatus,
    selected: Option<FileMeta>,
    reference: Option<String>,
    error: Option<String>,
    attempt: u64,
}

impl Default for UploadSlot {
    fn default() -> Self {
        Self {
            status: UploadStatus::Idle,
            selected: None,
            reference: None,
            error: None,
            attempt: 0,
        }
    }
}

impl UploadSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// The locally selected file, independent of upload status.
    pub fn selected(&self) -> Option<&FileMeta> {
        self.selected.as_ref()
    }

    /// The reference URL returned by the asset host, if the upload succeeded.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// The `cvFile` value for the submission payload (empty unless uploaded).
    pub fn cv_file(&self) -> &str {
        self.reference.as_deref().unwrap_or("")
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start uploading `file`.
    ///
    /// Files failing the CV file rule are rejected without an upload: the
    /// slot moves to `Failed` with the rule message. Otherwise any previous
    /// reference is dropped and a fresh ticket is issued.
    pub fn select(&mut self, file: &SelectedFile) -> Result<UploadTicket, RuleViolation> {
        self.attempt += 1;
        self.reference = None;

        let meta = file.meta();
        if let Err(violation) = check_file(Some(&meta)) {
            self.status = UploadStatus::Failed;
            self.selected = None;
            self.error = Some(violation.to_string());
            return Err(violation);
        }

        self.status = UploadStatus::Uploading;
        self.selected = Some(meta);
        self.error = None;
        Ok(UploadTicket(self.attempt))
    }

    /// Apply the outcome of the upload identified by `ticket`.
    ///
    /// Returns `false` when the ticket is stale (the file was removed or
    /// replaced meanwhile) and the outcome was discarded.
    pub fn complete(&mut self, ticket: UploadTicket, outcome: Result<String, String>) -> bool {
        if ticket.0 != self.attempt || self.status != UploadStatus::Uploading {
            return false;
        }

        match outcome {
            Ok(url) if !url.is_empty() => {
                self.status = UploadStatus::Uploaded;
                self.reference = Some(url);
                self.error = None;
            }
            Ok(_) => self.fail(UPLOAD_FAILED_MESSAGE.to_string()),
            Err(message) => self.fail(message),
        }
        true
    }

    /// Clear the selected file and any stored reference.
    pub fn remove(&mut self) {
        self.attempt += 1;
        self.status = UploadStatus::Idle;
        self.selected = None;
        self.reference = None;
        self.error = None;
    }

    /// Check the slot as the upload step's file field.
    pub fn validate(&self) -> Result<(), RuleViolation> {
        match self.status {
            UploadStatus::Uploading => Err(RuleViolation::UploadPending),
            UploadStatus::Uploaded => check_file(self.selected.as_ref()),
            UploadStatus::Idle | UploadStatus::Failed => Err(RuleViolation::FileMissing),
        }
    }

    fn fail(&mut self, message: String) {
        self.status = UploadStatus::Failed;
        self.selected = None;
        self.reference = None;
        self.error = Some(message);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const URL: &str = "https://res.example.com/raw/upload/v1/cv.pdf";

    fn pdf() -> SelectedFile {
        SelectedFile::new("cv.pdf", "application/pdf", b"%PDF-1.7".to_vec())
    }

    /// `cvFile` must be empty whenever the slot is idle or failed.
    fn assert_no_stale_reference(slot: &UploadSlot) {
        if matches!(slot.status(), UploadStatus::Idle | UploadStatus::Failed) {
            assert_eq!(slot.cv_file(), "");
        }
    }

    #[test]
    fn starts_idle() {
        let slot = UploadSlot::new();
        assert_eq!(slot.status(), UploadStatus::Idle);
        assert!(slot.selected().is_none());
        assert_no_stale_reference(&slot);
    }

    #[test]
    fn successful_upload_stores_reference() {
        let mut slot = UploadSlot::new();
        let ticket = slot.select(&pdf()).unwrap();
        assert_eq!(slot.status(), UploadStatus::Uploading);
        assert_eq!(slot.selected().unwrap().name, "cv.pdf");
        assert_eq!(slot.cv_file(), "");

        assert!(slot.complete(ticket, Ok(URL.to_string())));
        assert_eq!(slot.status(), UploadStatus::Uploaded);
        assert_eq!(slot.cv_file(), URL);
        assert!(slot.validate().is_ok());
    }

    #[test]
    fn failed_upload_clears_file_and_reference() {
        let mut slot = UploadSlot::new();
        let ticket = slot.select(&pdf()).unwrap();
        slot.complete(ticket, Err(UPLOAD_FAILED_MESSAGE.to_string()));

        assert_eq!(slot.status(), UploadStatus::Failed);
        assert!(slot.selected().is_none());
        assert_eq!(slot.error(), Some(UPLOAD_FAILED_MESSAGE));
        assert_no_stale_reference(&slot);
        assert_eq!(slot.validate(), Err(RuleViolation::FileMissing));
    }

    #[test]
    fn reselect_after_failure_retries() {
        let mut slot = UploadSlot::new();
        let first = slot.select(&pdf()).unwrap();
        slot.complete(first, Err("boom".into()));

        let second = slot.select(&pdf()).unwrap();
        assert_eq!(slot.status(), UploadStatus::Uploading);
        assert!(slot.error().is_none());
        assert!(slot.complete(second, Ok(URL.into())));
        assert_eq!(slot.cv_file(), URL);
    }

    #[test]
    fn reselect_after_success_drops_old_reference() {
        let mut slot = UploadSlot::new();
        let first = slot.select(&pdf()).unwrap();
        slot.complete(first, Ok(URL.into()));

        slot.select(&pdf()).unwrap();
        assert_eq!(slot.cv_file(), "");
        assert_eq!(slot.validate(), Err(RuleViolation::UploadPending));
    }

    #[test]
    fn remove_resets_from_any_state() {
        let mut slot = UploadSlot::new();
        let ticket = slot.select(&pdf()).unwrap();
        slot.complete(ticket, Ok(URL.into()));

        slot.remove();
        assert_eq!(slot.status(), UploadStatus::Idle);
        assert!(slot.selected().is_none());
        assert_no_stale_reference(&slot);
    }

    #[test]
    fn completion_after_remove_is_discarded() {
        let mut slot = UploadSlot::new();
        let ticket = slot.select(&pdf()).unwrap();
        slot.remove();

        assert!(!slot.complete(ticket, Ok(URL.into())));
        assert_eq!(slot.status(), UploadStatus::Idle);
        assert_no_stale_reference(&slot);
    }

    #[test]
    fn completion_of_superseded_upload_is_discarded() {
        let mut slot = UploadSlot::new();
        let old = slot.select(&pdf()).unwrap();
        let current = slot.select(&pdf()).unwrap();

        assert!(!slot.complete(old, Ok("https://stale".into())));
        assert_eq!(slot.status(), UploadStatus::Uploading);
        assert!(slot.complete(current, Ok(URL.into())));
        assert_eq!(slot.cv_file(), URL);
    }

    #[test]
    fn oversize_file_is_rejected_before_upload() {
        let mut slot = UploadSlot::new();
        let big = SelectedFile::new(
            "huge.pdf",
            "application/pdf",
            vec![0; crate::validation::MAX_CV_BYTES as usize],
        );

        assert_matches!(slot.select(&big), Err(RuleViolation::FileTooLarge { .. }));
        assert_eq!(slot.status(), UploadStatus::Failed);
        assert_eq!(slot.error(), Some("File must be under 5MB"));
        assert_no_stale_reference(&slot);
    }

    #[test]
    fn image_is_rejected_before_upload() {
        let mut slot = UploadSlot::new();
        let photo = SelectedFile::new("cv.png", "image/png", vec![0; 16]);

        assert_eq!(slot.select(&photo), Err(RuleViolation::FileType));
        assert_eq!(slot.status(), UploadStatus::Failed);
        assert_eq!(slot.error(), Some("Please upload a PDF or Word document"));
        assert!(slot.selected().is_none());
    }

    #[test]
    fn empty_url_counts_as_failure() {
        let mut slot = UploadSlot::new();
        let ticket = slot.select(&pdf()).unwrap();
        slot.complete(ticket, Ok(String::new()));
        assert_eq!(slot.status(), UploadStatus::Failed);
        assert_no_stale_reference(&slot);
    }
}
