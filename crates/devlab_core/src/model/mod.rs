//! Domain model for projects, participations, teams, tasks and users.
//!
//! # Responsibility
//! - Define canonical records shared by repositories and services.
//! - Own record-local validation (`validate()`), separate from persistence.
//!
//! # Invariants
//! - Every record is identified by a stable UUID v4.
//! - Date ranges never end before they start.
//! - Cross-record rules (participation, leadership) are enforced by services
//!   and storage, not by these types.

use chrono::{Local, NaiveDate};

pub mod participation;
pub mod project;
pub mod task;
pub mod team;
pub mod user;
pub mod validation;

/// Returns the current local calendar date.
///
/// Used as the default start/entry date for new records.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
