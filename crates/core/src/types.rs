//! Shared scalar aliases.

/// Submission ids are `BIGSERIAL` in PostgreSQL.
pub type DbId = i64;

/// Creation and update times, always UTC. Display conversion to East Africa
/// Time happens in [`crate::dashboard::format_eat`].
pub type Timestamp = chrono::DateTime<chrono::Utc>;
