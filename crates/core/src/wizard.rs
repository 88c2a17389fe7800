//! Multi-step form wizard: step definitions, field ownership and the
//! navigation state machine.
//!
//! ```text
//!   Personal ──next──▶ Education ──next──▶ Experience ──next──▶ Upload ──submit──▶ done
//!      ◀──previous──       ◀──previous──        ◀──previous──
//! ```
//!
//! `next` only advances when every field the current step owns passes its
//! rule. `previous` never re-validates. `submit` is only reachable from the
//! last step and only one submission may be pending at a time.

use serde::{Deserialize, Serialize};

use crate::draft::{DraftField, FormDraft};
use crate::error::{CoreError, FieldErrors};
use crate::submission::SubmissionPayload;
use crate::upload::UploadStatus;
use crate::validation::RuleViolation;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The four steps of the form, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Personal,
    Education,
    Experience,
    Upload,
}

/// Total number of steps in the wizard.
pub const TOTAL_STEPS: usize = 4;

pub const STEPS: [Step; TOTAL_STEPS] = [Step::Personal, Step::Education, Step::Experience, Step::Upload];

/// A field owned by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepField {
    Scalar(DraftField),
    ExperienceList,
    CvFile,
    DataConsent,
}

impl StepField {
    pub fn key(self) -> &'static str {
        match self {
            Self::Scalar(f) => f.key(),
            Self::ExperienceList => "experienceList",
            Self::CvFile => "cvFile",
            Self::DataConsent => "dataConsent",
        }
    }
}

const PERSONAL_FIELDS: &[StepField] = &[
    StepField::Scalar(DraftField::Name),
    StepField::Scalar(DraftField::JobTitle),
    StepField::Scalar(DraftField::JobType),
    StepField::Scalar(DraftField::Supervisor),
    StepField::Scalar(DraftField::Department),
    StepField::Scalar(DraftField::Section),
    StepField::Scalar(DraftField::School),
    StepField::Scalar(DraftField::Location),
    StepField::Scalar(DraftField::Country),
];

const EDUCATION_FIELDS: &[StepField] = &[
    StepField::Scalar(DraftField::EducationLevel),
    StepField::Scalar(DraftField::Qualifications),
    StepField::Scalar(DraftField::OtherEducation),
    StepField::Scalar(DraftField::OtherSkills),
];

const EXPERIENCE_FIELDS: &[StepField] = &[StepField::ExperienceList];

const UPLOAD_FIELDS: &[StepField] = &[StepField::CvFile, StepField::DataConsent];

impl Step {
    /// Zero-based position of the step.
    pub fn index(self) -> usize {
        match self {
            Self::Personal => 0,
            Self::Education => 1,
            Self::Experience => 2,
            Self::Upload => 3,
        }
    }

    pub fn from_index(index: usize) -> Result<Self, CoreError> {
        STEPS.get(index).copied().ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid step index {index}. Must be between 0 and {}",
                TOTAL_STEPS - 1
            ))
        })
    }

    /// Short label for the progress indicator.
    pub fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Education => "Education",
            Self::Experience => "Experience",
            Self::Upload => "Upload CV",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Personal => "Part A: Job and Personal Data",
            Self::Education => "Part B: Education & Skills",
            Self::Experience => "Part C: Professional Experience",
            Self::Upload => "Part D: Upload Your CV",
        }
    }

    /// The fields this step validates before advancing.
    pub fn fields(self) -> &'static [StepField] {
        match self {
            Self::Personal => PERSONAL_FIELDS,
            Self::Education => EDUCATION_FIELDS,
            Self::Experience => EXPERIENCE_FIELDS,
            Self::Upload => UPLOAD_FIELDS,
        }
    }

    pub fn is_first(self) -> bool {
        self.index() == 0
    }

    pub fn is_last(self) -> bool {
        self.index() == TOTAL_STEPS - 1
    }
}

// ---------------------------------------------------------------------------
// Step validation
// ---------------------------------------------------------------------------

/// Authoritative validation of every field `step` owns.
pub fn validate_step(step: Step, draft: &FormDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for &field in step.fields() {
        match field {
            StepField::Scalar(f) => errors.extend(draft.validate_fields(&[f])),
            StepField::ExperienceList => errors.extend(draft.experience().validate()),
            StepField::CvFile => {
                if let Err(violation) = draft.upload().validate() {
                    errors.insert(field.key(), violation.to_string());
                }
            }
            StepField::DataConsent => {
                if !draft.data_consent() {
                    errors.insert(field.key(), RuleViolation::ConsentRequired.to_string());
                }
            }
        }
    }
    errors
}

/// Cheap presence check re-derived on every keystroke to enable or disable
/// the "Next" control. It does not replace [`validate_step`].
pub fn is_step_valid(step: Step, draft: &FormDraft) -> bool {
    step.fields().iter().all(|&field| match field {
        StepField::Scalar(f) => match f.rule() {
            Some(rule) if rule.is_required() => !draft.get(f).is_empty(),
            _ => true,
        },
        StepField::ExperienceList => draft.experience().is_filled(),
        StepField::CvFile => draft.upload().status() == UploadStatus::Uploaded,
        StepField::DataConsent => draft.data_consent(),
    })
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

pub const MSG_STEP_INVALID: &str = "Please fix the highlighted fields before continuing";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    current: Step,
    submitting: bool,
}

impl Default for Wizard {
    fn default() -> Self {
        Self {
            current: Step::Personal,
            submitting: false,
        }
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Step {
        self.current
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Whether the "Next" control should be enabled.
    pub fn can_advance(&self, draft: &FormDraft) -> bool {
        !self.current.is_last() && is_step_valid(self.current, draft)
    }

    /// Whether the "Submit" control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.current.is_last() && !self.submitting
    }

    /// Validate the current step and move forward one step.
    ///
    /// On the last step this is a no-op once the step validates.
    pub fn next(&mut self, draft: &FormDraft) -> Result<Step, CoreError> {
        validate_step(self.current, draft).into_result(MSG_STEP_INVALID)?;
        let next = (self.current.index() + 1).min(TOTAL_STEPS - 1);
        self.current = Step::from_index(next)?;
        Ok(self.current)
    }

    /// Move back one step without validating.
    pub fn previous(&mut self) -> Result<Step, CoreError> {
        if self.current.is_first() {
            return Err(CoreError::Validation(
                "Already on the first step".to_string(),
            ));
        }
        self.current = Step::from_index(self.current.index() - 1)?;
        Ok(self.current)
    }

    /// Validate the last step and mark a submission as pending, returning the
    /// assembled payload.
    pub fn begin_submit(&mut self, draft: &FormDraft) -> Result<SubmissionPayload, CoreError> {
        if !self.current.is_last() {
            return Err(CoreError::Validation(format!(
                "Cannot submit from step '{}'; submission is only allowed from '{}'",
                self.current.label(),
                Step::Upload.label()
            )));
        }
        if self.submitting {
            return Err(CoreError::Conflict(
                "A submission is already in progress".to_string(),
            ));
        }
        validate_step(self.current, draft).into_result(MSG_STEP_INVALID)?;
        self.submitting = true;
        Ok(draft.to_payload())
    }

    /// Clear the pending flag.
    ///
    /// After a success the caller discards the draft and this wizard; after a
    /// failure the state is unchanged and the user may resubmit.
    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
