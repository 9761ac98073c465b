//! Project registry model.
//!
//! # Invariants
//! - `expected_end_date`, when set, is not earlier than `start_date`.
//! - `creator_id` never changes after creation.

use crate::model::today;
use crate::model::user::UserId;
use crate::model::validation::{check_date_order, check_required_text, ValidationErrors};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

const NAME_MAX_CHARS: usize = 200;
const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Project lifecycle status. Any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub expected_end_date: Option<NaiveDate>,
    pub creator_id: UserId,
    pub advisor_id: Option<UserId>,
    pub is_public: bool,
}

impl Project {
    /// Creates a private, not-started project starting today.
    pub fn new(name: impl Into<String>, creator_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            status: ProjectStatus::default(),
            start_date: today(),
            expected_end_date: None,
            creator_id,
            advisor_id: None,
            is_public: false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_required_text("name", &self.name, NAME_MAX_CHARS, &mut errors);
        if self.description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.add(
                "description",
                format!("ensure this field has no more than {DESCRIPTION_MAX_CHARS} characters"),
            );
        }
        check_date_order(self.start_date, self.expected_end_date, &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::{Project, ProjectStatus};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn new_project_defaults() {
        let project = Project::new("Robotics", Uuid::new_v4());
        assert_eq!(project.status, ProjectStatus::NotStarted);
        assert!(!project.is_public);
        assert!(project.advisor_id.is_none());
        assert!(project.validate().is_ok());
    }

    #[test]
    fn validate_rejects_reversed_dates() {
        let mut project = Project::new("Robotics", Uuid::new_v4());
        project.start_date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        project.expected_end_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        let errors = project.validate().unwrap_err();
        assert!(errors.contains("expected_end_date"));
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(ProjectStatus::parse("cancelled"), Some(ProjectStatus::Cancelled));
    }
}
