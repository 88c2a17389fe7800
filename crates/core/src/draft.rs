//! The in-progress form draft and its reducer-style transitions.
//!
//! A [`FormDraft`] lives only in client memory. Every change goes through a
//! transition method so the dependent-field invariant always holds: a child
//! selection (section, school, location, country) never refers to an option
//! that is invalid for its current parent.

use serde::Serialize;

use crate::error::{CoreError, FieldErrors};
use crate::experience::ExperienceList;
use crate::lookup::{normalize_section, LookupTable};
use crate::submission::{EducationLevel, JobType, SubmissionPayload};
use crate::upload::UploadSlot;
use crate::validation::{education, personal, FieldRule};

/// Scalar fields of the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Name,
    JobTitle,
    JobType,
    Supervisor,
    Department,
    Section,
    School,
    Location,
    Country,
    EducationLevel,
    Qualifications,
    OtherEducation,
    OtherSkills,
}

impl DraftField {
    /// JSON key of the field in the submission payload.
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::JobTitle => "jobTitle",
            Self::JobType => "jobType",
            Self::Supervisor => "supervisor",
            Self::Department => "department",
            Self::Section => "section",
            Self::School => "school",
            Self::Location => "location",
            Self::Country => "country",
            Self::EducationLevel => "educationLevel",
            Self::Qualifications => "qualifications",
            Self::OtherEducation => "otherEducation",
            Self::OtherSkills => "otherSkills",
        }
    }

    /// The validation rule for this field; `None` for unvalidated fields.
    pub fn rule(self) -> Option<FieldRule> {
        match self {
            Self::Name => Some(personal::NAME),
            Self::JobTitle => Some(personal::JOB_TITLE),
            Self::JobType => Some(personal::JOB_TYPE),
            Self::Supervisor => Some(personal::SUPERVISOR),
            Self::Department => Some(personal::DEPARTMENT),
            Self::Section => Some(personal::SECTION),
            Self::School | Self::Location | Self::Country => None,
            Self::EducationLevel => Some(education::EDUCATION_LEVEL),
            Self::Qualifications => Some(education::QUALIFICATIONS),
            Self::OtherEducation => Some(education::OTHER_EDUCATION),
            Self::OtherSkills => Some(education::OTHER_SKILLS),
        }
    }

    /// Location and country are derived from the school selection.
    pub fn is_read_only(self) -> bool {
        matches!(self, Self::Location | Self::Country)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDraft {
    name: String,
    job_title: String,
    job_type: String,
    supervisor: String,
    department: String,
    section: String,
    school: String,
    location: String,
    country: String,
    education_level: String,
    qualifications: String,
    other_education: String,
    other_skills: String,
    #[serde(rename = "experienceList")]
    experience: ExperienceList,
    #[serde(skip)]
    upload: UploadSlot,
    data_consent: bool,
}

impl FormDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::JobTitle => &self.job_title,
            DraftField::JobType => &self.job_type,
            DraftField::Supervisor => &self.supervisor,
            DraftField::Department => &self.department,
            DraftField::Section => &self.section,
            DraftField::School => &self.school,
            DraftField::Location => &self.location,
            DraftField::Country => &self.country,
            DraftField::EducationLevel => &self.education_level,
            DraftField::Qualifications => &self.qualifications,
            DraftField::OtherEducation => &self.other_education,
            DraftField::OtherSkills => &self.other_skills,
        }
    }

    fn slot(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::Name => &mut self.name,
            DraftField::JobTitle => &mut self.job_title,
            DraftField::JobType => &mut self.job_type,
            DraftField::Supervisor => &mut self.supervisor,
            DraftField::Department => &mut self.department,
            DraftField::Section => &mut self.section,
            DraftField::School => &mut self.school,
            DraftField::Location => &mut self.location,
            DraftField::Country => &mut self.country,
            DraftField::EducationLevel => &mut self.education_level,
            DraftField::Qualifications => &mut self.qualifications,
            DraftField::OtherEducation => &mut self.other_education,
            DraftField::OtherSkills => &mut self.other_skills,
        }
    }

    pub fn experience(&self) -> &ExperienceList {
        &self.experience
    }

    pub fn experience_mut(&mut self) -> &mut ExperienceList {
        &mut self.experience
    }

    pub fn upload(&self) -> &UploadSlot {
        &self.upload
    }

    pub fn upload_mut(&mut self) -> &mut UploadSlot {
        &mut self.upload
    }

    pub fn data_consent(&self) -> bool {
        self.data_consent
    }

    pub fn set_data_consent(&mut self, consent: bool) {
        self.data_consent = consent;
    }

    /// Set a scalar field.
    ///
    /// A changed department clears section, school, location and country; a
    /// changed section clears school, location and country; a changed school
    /// re-derives location and country from `table`. Setting a field to its
    /// current value is a no-op. Location and country cannot be set directly.
    ///
    /// Sections are stored under their canonical name, so the displayed
    /// placeholder for "no section" is accepted as input. Education levels
    /// are stored under their canonical label.
    ///
    /// A non-empty department, section or school must be one of the options
    /// offered for its current parent, and job type and education level must
    /// be one of their enum labels. Anything else is rejected and the draft is
    /// left unchanged. An empty value always clears the field.
    pub fn apply_field_change(
        &mut self,
        table: &LookupTable,
        field: DraftField,
        value: impl Into<String>,
    ) -> Result<(), CoreError> {
        if field.is_read_only() {
            return Err(CoreError::Validation(format!(
                "{} is auto-filled and cannot be edited",
                field.key()
            )));
        }

        let mut value = value.into();
        if !value.is_empty() {
            value = self.check_option(table, field, value)?;
        }
        if *self.slot(field) == value {
            return Ok(());
        }

        *self.slot(field) = value;
        self.reset_downstream(field);

        if field == DraftField::School {
            let lc = table.location_country_for(&self.department, &self.section, &self.school);
            self.location = lc.location;
            self.country = lc.country;
        }
        Ok(())
    }

    /// Canonical form of `value` if it is a valid option for `field`.
    fn check_option(
        &self,
        table: &LookupTable,
        field: DraftField,
        value: String,
    ) -> Result<String, CoreError> {
        let offered = match field {
            DraftField::Department => table.has_department(&value),
            DraftField::Section => table.has_section(&self.department, &value),
            DraftField::School => table.has_school(&self.department, &self.section, &value),
            DraftField::JobType => return JobType::from_label(&value).map(|_| value),
            DraftField::EducationLevel => {
                return EducationLevel::from_label(&value).map(|l| l.as_str().to_string())
            }
            _ => return Ok(value),
        };

        if !offered {
            return Err(CoreError::Validation(format!(
                "'{value}' is not an available {} option",
                field.key()
            )));
        }
        Ok(match field {
            DraftField::Section => normalize_section(&value).to_string(),
            _ => value,
        })
    }

    /// Clear every field that depends on `field`.
    pub fn reset_downstream(&mut self, field: DraftField) {
        match field {
            DraftField::Department => {
                self.section.clear();
                self.school.clear();
                self.location.clear();
                self.country.clear();
            }
            DraftField::Section => {
                self.school.clear();
                self.location.clear();
                self.country.clear();
            }
            DraftField::School => {
                self.location.clear();
                self.country.clear();
            }
            _ => {}
        }
    }

    /// Run the rules of the given scalar fields.
    pub fn validate_fields(&self, fields: &[DraftField]) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for &field in fields {
            if let Some(rule) = field.rule() {
                if let Err(violation) = rule.check(self.get(field)) {
                    errors.insert(field.key(), violation.to_string());
                }
            }
        }
        errors
    }

    /// Assemble the create payload from the whole draft.
    pub fn to_payload(&self) -> SubmissionPayload {
        fn opt(value: &str) -> Option<String> {
            (!value.is_empty()).then(|| value.to_string())
        }
        SubmissionPayload {
            name: opt(&self.name),
            job_title: opt(&self.job_title),
            job_type: opt(&self.job_type),
            supervisor: opt(&self.supervisor),
            department: opt(&self.department),
            section: opt(&self.section),
            location: Some(self.location.clone()),
            country: Some(self.country.clone()),
            school: Some(self.school.clone()),
            education_level: opt(&self.education_level),
            qualifications: Some(self.qualifications.clone()),
            other_education: Some(self.other_education.clone()),
            other_skills: Some(self.other_skills.clone()),
            experience_list: Some(self.experience.to_payload()),
            experience_summary: None,
            cv_file: opt(self.upload.cv_file()),
            data_consent: Some(self.data_consent),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
