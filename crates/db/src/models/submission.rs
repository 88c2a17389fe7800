//! Row shape of the `submissions` table.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use staffdata_core::error::CoreError;
use staffdata_core::submission::{
    EducationLevel, ExperienceEntry, JobType, NewSubmission, Submission,
};
use staffdata_core::types::{DbId, Timestamp};

/// A row from the `submissions` table.
///
/// Enum-typed columns are stored as their display labels and parsed back
/// into domain enums by the [`TryFrom`] conversion.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubmissionRow {
    pub id: DbId,
    pub name: String,
    pub job_title: String,
    pub job_type: String,
    pub supervisor: String,
    pub department: String,
    pub section: String,
    pub location: String,
    pub country: String,
    pub school: String,
    pub education_level: String,
    pub qualifications: String,
    pub other_education: String,
    pub other_skills: String,
    pub experience_list: Json<Vec<ExperienceEntry>>,
    pub experience_summary: Option<String>,
    pub cv_file: String,
    pub data_consent: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = CoreError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        Ok(Submission {
            id: row.id,
            fields: NewSubmission {
                name: row.name,
                job_title: row.job_title,
                job_type: JobType::from_label(&row.job_type)?,
                supervisor: row.supervisor,
                department: row.department,
                section: row.section,
                location: row.location,
                country: row.country,
                school: row.school,
                education_level: EducationLevel::from_label(&row.education_level)?,
                qualifications: row.qualifications,
                other_education: row.other_education,
                other_skills: row.other_skills,
                experience_list: row.experience_list.0,
                experience_summary: row.experience_summary,
                cv_file: row.cv_file,
                data_consent: row.data_consent,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
