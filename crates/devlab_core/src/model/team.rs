//! Team registry model.
//!
//! # Invariants
//! - A team belongs to exactly one project and its name is unique there.
//! - A user leads at most one team across the whole system.
//! - `leader_id`, when set, refers to an active participant of the project.

use crate::model::project::ProjectId;
use crate::model::today;
use crate::model::user::UserId;
use crate::model::validation::{check_required_text, ValidationErrors};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

pub type TeamId = Uuid;

const NAME_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub description: Option<String>,
    pub project_id: ProjectId,
    pub leader_id: Option<UserId>,
    /// Sorted member ids.
    pub member_ids: Vec<UserId>,
    pub created_on: NaiveDate,
}

impl Team {
    /// Creates a leaderless, memberless team created today.
    pub fn new(name: impl Into<String>, project_id: ProjectId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            project_id,
            leader_id: None,
            member_ids: Vec::new(),
            created_on: today(),
        }
    }

    pub fn has_member(&self, user_id: UserId) -> bool {
        self.member_ids.contains(&user_id)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_required_text("name", &self.name, NAME_MAX_CHARS, &mut errors);
        errors.into_result()
    }
}
