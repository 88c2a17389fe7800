//! Staff data submission model and the server-side required-field policy.
//!
//! [`SubmissionPayload`] is the wire shape of `POST /create`. It is
//! deliberately lenient (every field optional) so that a missing field is
//! reported as a validation failure rather than a deserialization error.
//! [`validate_payload`] turns it into a [`NewSubmission`], the only shape the
//! repository layer accepts.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldErrors};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Job type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    Permanent,
    Contractual,
    Intern,
    Volunteer,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        Self::Permanent,
        Self::Contractual,
        Self::Intern,
        Self::Volunteer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permanent => "Permanent",
            Self::Contractual => "Contractual",
            Self::Intern => "Intern",
            Self::Volunteer => "Volunteer",
        }
    }

    pub fn from_label(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid job type '{s}'. Must be one of: Permanent, Contractual, Intern, Volunteer"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Education level
// ---------------------------------------------------------------------------

/// Highest education level. Labels use the typographic apostrophe; the
/// ASCII apostrophe is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EducationLevel {
    #[serde(rename = "High School Only")]
    HighSchool,
    #[serde(rename = "High School + College Diploma/Professional Qualification")]
    HighSchoolDiploma,
    #[serde(rename = "Bachelor’s Degree", alias = "Bachelor's Degree")]
    Bachelor,
    #[serde(
        rename = "Bachelor’s + Additional Diploma/Professional Qualification",
        alias = "Bachelor's + Additional Diploma/Professional Qualification"
    )]
    BachelorDiploma,
    #[serde(rename = "Master’s Qualification", alias = "Master's Qualification")]
    Masters,
    #[serde(
        rename = "Master’s + Diploma/Professional Qualification",
        alias = "Master's + Diploma/Professional Qualification"
    )]
    MastersDiploma,
    #[serde(rename = "PhD")]
    Phd,
    #[serde(rename = "PhD + Diploma/Professional Qualification")]
    PhdDiploma,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 8] = [
        Self::HighSchool,
        Self::HighSchoolDiploma,
        Self::Bachelor,
        Self::BachelorDiploma,
        Self::Masters,
        Self::MastersDiploma,
        Self::Phd,
        Self::PhdDiploma,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighSchool => "High School Only",
            Self::HighSchoolDiploma => "High School + College Diploma/Professional Qualification",
            Self::Bachelor => "Bachelor’s Degree",
            Self::BachelorDiploma => "Bachelor’s + Additional Diploma/Professional Qualification",
            Self::Masters => "Master’s Qualification",
            Self::MastersDiploma => "Master’s + Diploma/Professional Qualification",
            Self::Phd => "PhD",
            Self::PhdDiploma => "PhD + Diploma/Professional Qualification",
        }
    }

    pub fn from_label(s: &str) -> Result<Self, CoreError> {
        let normalized = s.replace('\'', "’");
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| CoreError::Validation(format!("Invalid education level '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

/// Suggested duration ranges for an experience entry. `years` itself is
/// free text (e.g. "2020-2024").
pub const EXPERIENCE_RANGES: &[&str] = &[
    "1–2 years",
    "3–4 years",
    "5–6 years",
    "7–8 years",
    "9–10 years",
    "11–12 years",
    "Above 13 years",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub organization: String,
    pub years: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_held: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributions: Option<String>,
}

/// Wire shape of one experience entry; every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperiencePayload {
    pub organization: Option<String>,
    pub years: Option<String>,
    pub position_held: Option<String>,
    pub contributions: Option<String>,
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Request body of `POST /create`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub name: Option<String>,
    pub job_title: Option<String>,
    pub job_type: Option<String>,
    pub supervisor: Option<String>,
    pub department: Option<String>,
    pub section: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub school: Option<String>,
    pub education_level: Option<String>,
    pub qualifications: Option<String>,
    pub other_education: Option<String>,
    pub other_skills: Option<String>,
    pub experience_list: Option<Vec<ExperiencePayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_summary: Option<String>,
    pub cv_file: Option<String>,
    pub data_consent: Option<bool>,
}

/// A validated submission ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub name: String,
    pub job_title: String,
    pub job_type: JobType,
    pub supervisor: String,
    pub department: String,
    pub section: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub school: String,
    pub education_level: EducationLevel,
    #[serde(default)]
    pub qualifications: String,
    #[serde(default)]
    pub other_education: String,
    #[serde(default)]
    pub other_skills: String,
    pub experience_list: Vec<ExperienceEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_summary: Option<String>,
    pub cv_file: String,
    pub data_consent: bool,
}

/// A persisted submission, as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: DbId,
    #[serde(flatten)]
    pub fields: NewSubmission,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub const MSG_REQUIRED_FIELDS: &str = "All required fields must be provided";
pub const MSG_EXPERIENCE_FIELDS: &str =
    "Each experience entry requires an organization and a duration";

/// Trimmed, non-empty value of an optional string.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn owned_or_empty(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Apply the server-side required-field policy to a create payload.
///
/// Required: name, jobTitle, jobType, supervisor, department, section,
/// educationLevel, a non-empty experienceList, cvFile and a truthy
/// dataConsent. Each experience entry needs organization and years.
/// Enum-typed fields must carry one of the recognised labels.
pub fn validate_payload(payload: SubmissionPayload) -> Result<NewSubmission, CoreError> {
    let mut missing = FieldErrors::new();

    let required = [
        ("name", &payload.name),
        ("jobTitle", &payload.job_title),
        ("jobType", &payload.job_type),
        ("supervisor", &payload.supervisor),
        ("department", &payload.department),
        ("section", &payload.section),
        ("educationLevel", &payload.education_level),
        ("cvFile", &payload.cv_file),
    ];
    for (field, value) in required {
        if present(value).is_none() {
            missing.insert(field, format!("{field} is required"));
        }
    }
    if payload.experience_list.as_ref().map_or(true, Vec::is_empty) {
        missing.insert("experienceList", "At least one experience entry is required");
    }
    if payload.data_consent != Some(true) {
        missing.insert("dataConsent", "Consent to data processing is required");
    }
    missing.into_result(MSG_REQUIRED_FIELDS)?;

    let mut entry_errors = FieldErrors::new();
    let entries = payload.experience_list.unwrap_or_default();
    for (i, entry) in entries.iter().enumerate() {
        if present(&entry.organization).is_none() {
            entry_errors.insert(
                format!("experienceList[{i}].organization"),
                "organization is required",
            );
        }
        if present(&entry.years).is_none() {
            entry_errors.insert(format!("experienceList[{i}].years"), "years is required");
        }
    }
    entry_errors.into_result(MSG_EXPERIENCE_FIELDS)?;

    let job_type = JobType::from_label(present(&payload.job_type).unwrap_or_default())?;
    let education_level =
        EducationLevel::from_label(present(&payload.education_level).unwrap_or_default())?;

    let experience_list = entries
        .into_iter()
        .map(|e| ExperienceEntry {
            organization: owned_or_empty(e.organization),
            years: owned_or_empty(e.years),
            position_held: e.position_held.filter(|v| !v.trim().is_empty()),
            contributions: e.contributions.filter(|v| !v.trim().is_empty()),
        })
        .collect();

    Ok(NewSubmission {
        name: owned_or_empty(payload.name),
        job_title: owned_or_empty(payload.job_title),
        job_type,
        supervisor: owned_or_empty(payload.supervisor),
        department: owned_or_empty(payload.department),
        section: owned_or_empty(payload.section),
        location: owned_or_empty(payload.location),
        country: owned_or_empty(payload.country),
        school: owned_or_empty(payload.school),
        education_level,
        qualifications: owned_or_empty(payload.qualifications),
        other_education: owned_or_empty(payload.other_education),
        other_skills: owned_or_empty(payload.other_skills),
        experience_list,
        experience_summary: payload.experience_summary.filter(|v| !v.trim().is_empty()),
        cv_file: owned_or_empty(payload.cv_file),
        data_consent: true,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn jane_doe() -> serde_json::Value {
        json!({
            "name": "Jane Doe",
            "jobTitle": "Teacher",
            "jobType": "Permanent",
            "supervisor": "John Smith",
            "department": "Academics",
            "section": "Primary",
            "educationLevel": "Bachelor's Degree",
            "experienceList": [{"organization": "ABC School", "years": "3–4 years"}],
            "cvFile": "https://host/file.pdf",
            "dataConsent": true
        })
    }

    fn payload(value: serde_json::Value) -> SubmissionPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn valid_payload_is_accepted() {
        let sub = validate_payload(payload(jane_doe())).unwrap();
        assert_eq!(sub.name, "Jane Doe");
        assert_eq!(sub.job_type, JobType::Permanent);
        assert_eq!(sub.education_level, EducationLevel::Bachelor);
        assert_eq!(sub.experience_list.len(), 1);
        assert_eq!(sub.experience_list[0].position_held, None);
        assert_eq!(sub.location, "");
        assert!(sub.data_consent);
    }

    #[test]
    fn empty_experience_list_is_rejected() {
        let mut body = jane_doe();
        body["experienceList"] = json!([]);
        let err = validate_payload(payload(body)).unwrap_err();
        assert_matches!(err, CoreError::InvalidFields { ref message, ref errors }
            if message == MSG_REQUIRED_FIELDS && errors.contains("experienceList"));
    }

    #[test]
    fn each_missing_required_field_is_reported() {
        let err = validate_payload(SubmissionPayload::default()).unwrap_err();
        let CoreError::InvalidFields { errors, .. } = err else {
            panic!("expected InvalidFields");
        };
        for field in [
            "name",
            "jobTitle",
            "jobType",
            "supervisor",
            "department",
            "section",
            "educationLevel",
            "cvFile",
            "experienceList",
            "dataConsent",
        ] {
            assert!(errors.contains(field), "{field} should be reported");
        }
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let mut body = jane_doe();
        body["name"] = json!("   ");
        assert_matches!(
            validate_payload(payload(body)),
            Err(CoreError::InvalidFields { errors, .. }) if errors.contains("name")
        );
    }

    #[test]
    fn consent_must_be_true() {
        let mut body = jane_doe();
        body["dataConsent"] = json!(false);
        assert_matches!(
            validate_payload(payload(body)),
            Err(CoreError::InvalidFields { errors, .. }) if errors.contains("dataConsent")
        );
    }

    #[test]
    fn experience_entry_needs_organization_and_years() {
        let mut body = jane_doe();
        body["experienceList"] = json!([
            {"organization": "ABC School", "years": "1–2 years"},
            {"organization": "", "positionHeld": "Teacher"}
        ]);
        let err = validate_payload(payload(body)).unwrap_err();
        let CoreError::InvalidFields { message, errors } = err else {
            panic!("expected InvalidFields");
        };
        assert_eq!(message, MSG_EXPERIENCE_FIELDS);
        assert!(errors.contains("experienceList[1].organization"));
        assert!(errors.contains("experienceList[1].years"));
        assert!(!errors.contains("experienceList[0].organization"));
    }

    #[test]
    fn unknown_job_type_is_rejected() {
        let mut body = jane_doe();
        body["jobType"] = json!("Freelance");
        assert_matches!(validate_payload(payload(body)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn education_level_accepts_both_apostrophes() {
        assert_eq!(
            EducationLevel::from_label("Master's Qualification").unwrap(),
            EducationLevel::Masters
        );
        assert_eq!(
            EducationLevel::from_label("Master’s Qualification").unwrap(),
            EducationLevel::Masters
        );
        assert!(EducationLevel::from_label("Diploma").is_err());
    }

    #[test]
    fn education_level_serializes_canonical_label() {
        let level: EducationLevel = serde_json::from_value(json!("Bachelor's Degree")).unwrap();
        assert_eq!(serde_json::to_value(level).unwrap(), json!("Bachelor’s Degree"));
    }

    #[test]
    fn enum_labels_roundtrip() {
        for t in JobType::ALL {
            assert_eq!(JobType::from_label(t.as_str()).unwrap(), t);
            assert_eq!(serde_json::to_value(t).unwrap(), json!(t.as_str()));
        }
        for level in EducationLevel::ALL {
            assert_eq!(EducationLevel::from_label(level.as_str()).unwrap(), level);
            assert_eq!(serde_json::to_value(level).unwrap(), json!(level.as_str()));
        }
    }

    #[test]
    fn submission_serializes_flat_camel_case() {
        let fields = validate_payload(payload(jane_doe())).unwrap();
        let now = chrono::Utc::now();
        let sub = Submission {
            id: 7,
            fields,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&sub).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["name"], "Jane Doe");
        assert_eq!(value["jobTitle"], "Teacher");
        assert_eq!(value["experienceList"][0]["organization"], "ABC School");
        assert!(value["createdAt"].is_string());

        let back: Submission = serde_json::from_value(value).unwrap();
        assert_eq!(back, sub);
    }
}
