//! Repository for the `submissions` table.

use sqlx::types::Json;
use sqlx::PgPool;
use staffdata_core::submission::{NewSubmission, Submission};

use crate::models::submission::SubmissionRow;

/// Column list for submissions queries.
const COLUMNS: &str = "id, name, job_title, job_type, supervisor, department, section, \
    location, country, school, education_level, qualifications, other_education, \
    other_skills, experience_list, experience_summary, cv_file, data_consent, \
    created_at, updated_at";

/// Create and list operations for staff data submissions. Submissions are
/// never updated or deleted.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert a validated submission, returning the persisted record.
    pub async fn create(pool: &PgPool, input: &NewSubmission) -> Result<Submission, sqlx::Error> {
        let query = format!(
            "INSERT INTO submissions
                (name, job_title, job_type, supervisor, department, section,
                 location, country, school, education_level, qualifications,
                 other_education, other_skills, experience_list, experience_summary,
                 cv_file, data_consent)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(&input.name)
            .bind(&input.job_title)
            .bind(input.job_type.as_str())
            .bind(&input.supervisor)
            .bind(&input.department)
            .bind(&input.section)
            .bind(&input.location)
            .bind(&input.country)
            .bind(&input.school)
            .bind(input.education_level.as_str())
            .bind(&input.qualifications)
            .bind(&input.other_education)
            .bind(&input.other_skills)
            .bind(Json(&input.experience_list))
            .bind(&input.experience_summary)
            .bind(&input.cv_file)
            .bind(input.data_consent)
            .fetch_one(pool)
            .await?;
        into_submission(row)
    }

    /// List every submission in storage order. Callers sort for display.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Submission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions");
        sqlx::query_as::<_, SubmissionRow>(&query)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(into_submission)
            .collect()
    }
}

/// A stored label that no longer parses is a decode failure, not a domain error.
fn into_submission(row: SubmissionRow) -> Result<Submission, sqlx::Error> {
    Submission::try_from(row).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
