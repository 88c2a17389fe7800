//! Async client side of the staff data system.
//!
//! Drives the form wizard against a live API ([`form::FormSession`]),
//! uploads CVs to the external asset host ([`asset_host`]) and keeps the
//! admin dashboard list fresh ([`dashboard::DashboardSession`]).

pub mod asset_host;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod gateway;
