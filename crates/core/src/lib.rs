//! Domain logic for the staff data collection system.
//!
//! Everything in this crate is pure: no network, no database, no clock
//! reads. The API server, the repository layer and the async client all
//! build on these types.

pub mod dashboard;
pub mod draft;
pub mod error;
pub mod experience;
pub mod lookup;
pub mod submission;
pub mod types;
pub mod upload;
pub mod validation;
pub mod wizard;
