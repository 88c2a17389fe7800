//! Request handlers. Each handler delegates to `staffdata_core` for
//! validation and to `staffdata_db` for persistence, mapping errors via
//! [`crate::error::AppError`].

pub mod submissions;
