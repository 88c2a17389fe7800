//! One user's pass through the form wizard, wired to the asset host and the
//! submission gateway.

use std::sync::Arc;

use staffdata_core::draft::{DraftField, FormDraft};
use staffdata_core::error::CoreError;
use staffdata_core::experience::ExperienceField;
use staffdata_core::lookup::{DependentOptions, LookupTable};
use staffdata_core::upload::{SelectedFile, UploadStatus};
use staffdata_core::wizard::{is_step_valid, Step, Wizard};

use crate::asset_host::{begin_upload, AssetHost, CompletedUpload, PendingUpload};
use crate::gateway::{SubmissionGateway, SubmitOutcome};

pub struct FormSession {
    table: Arc<LookupTable>,
    host: Arc<dyn AssetHost>,
    gateway: SubmissionGateway,
    draft: FormDraft,
    wizard: Wizard,
    notice: Option<String>,
}

impl FormSession {
    pub fn new(
        table: Arc<LookupTable>,
        host: Arc<dyn AssetHost>,
        gateway: SubmissionGateway,
    ) -> Self {
        Self {
            table,
            host,
            gateway,
            draft: FormDraft::new(),
            wizard: Wizard::new(),
            notice: None,
        }
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.wizard.is_submitting()
    }

    pub fn current_step(&self) -> Step {
        self.wizard.current()
    }

    /// The last user-facing message (submission result or upload error).
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Dropdown options for the current Part A selections.
    pub fn options(&self) -> DependentOptions {
        self.table.options_for(
            self.draft.get(DraftField::Department),
            self.draft.get(DraftField::Section),
        )
    }

    pub fn set_field(
        &mut self,
        field: DraftField,
        value: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.draft.apply_field_change(&self.table, field, value)
    }

    pub fn add_experience(&mut self) -> usize {
        self.draft.experience_mut().append_blank()
    }

    pub fn remove_experience(&mut self, index: usize) -> Result<(), CoreError> {
        self.draft.experience_mut().remove(index).map(|_| ())
    }

    pub fn update_experience(
        &mut self,
        index: usize,
        field: ExperienceField,
        value: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.draft.experience_mut().update(index, field, value)
    }

    pub fn set_consent(&mut self, consent: bool) {
        self.draft.set_data_consent(consent);
    }

    // -- navigation --

    /// Whether the "Next" control is enabled right now.
    pub fn can_advance(&self) -> bool {
        self.wizard.can_advance(&self.draft)
    }

    pub fn is_current_step_valid(&self) -> bool {
        is_step_valid(self.wizard.current(), &self.draft)
    }

    pub fn next(&mut self) -> Result<Step, CoreError> {
        self.wizard.next(&self.draft)
    }

    pub fn previous(&mut self) -> Result<Step, CoreError> {
        self.wizard.previous()
    }

    // -- upload --

    /// Accept `file` into the upload slot and hand back the transfer to run.
    ///
    /// The caller may keep editing the draft while the returned upload is in
    /// flight and feed its result to [`FormSession::finish_upload`].
    pub fn start_upload(&mut self, file: SelectedFile) -> Option<PendingUpload> {
        match begin_upload(self.draft.upload_mut(), file) {
            Ok(pending) => Some(pending),
            Err(violation) => {
                self.notice = Some(violation.to_string());
                None
            }
        }
    }

    pub fn finish_upload(&mut self, completed: CompletedUpload) -> bool {
        let applied = completed.apply(self.draft.upload_mut());
        if applied {
            self.notice = self.draft.upload().error().map(str::to_string);
        }
        applied
    }

    /// Select a file and upload it to completion.
    pub async fn select_file(&mut self, file: SelectedFile) -> UploadStatus {
        if let Some(pending) = self.start_upload(file) {
            let completed = pending.run(self.host.as_ref()).await;
            self.finish_upload(completed);
        }
        self.draft.upload().status()
    }

    pub fn remove_file(&mut self) {
        self.draft.upload_mut().remove();
    }

    // -- submit --

    /// Validate the last step and post the draft.
    ///
    /// On success the draft and wizard are reset. On any failure both are
    /// left as they were so the user can fix things and resubmit. Dropping
    /// the returned future mid-request also re-enables submitting.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, CoreError> {
        let payload = self.wizard.begin_submit(&self.draft)?;
        let outcome = {
            let _submitting = SubmittingGuard(&mut self.wizard);
            self.gateway.submit(&payload).await
        };

        self.notice = Some(outcome.display_message());
        if outcome.is_created() {
            self.draft = FormDraft::new();
            self.wizard = Wizard::new();
        }
        Ok(outcome)
    }
}

/// Clears the wizard's submitting flag when the request finishes or is
/// abandoned.
struct SubmittingGuard<'a>(&'a mut Wizard);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.finish_submit();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
