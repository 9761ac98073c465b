//! Participation ledger model: which users take part in which project.
//!
//! # Invariants
//! - One record per `(user_id, project_id)` pair; leaving a project flips
//!   `is_active` instead of deleting the row.
//! - `is_leader` implies `is_active`.
//! - At most one record per project has `is_leader = true`.

use crate::model::project::ProjectId;
use crate::model::user::UserId;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

pub type ParticipationId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participation {
    pub id: ParticipationId,
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    pub is_active: bool,
    pub is_leader: bool,
}

impl Participation {
    /// Creates an active, non-leader participation entered on `entry_date`.
    pub fn new(user_id: UserId, project_id: ProjectId, entry_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            project_id,
            entry_date,
            exit_date: None,
            is_active: true,
            is_leader: false,
        }
    }
}
