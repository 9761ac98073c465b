//! Task board model.
//!
//! # Invariants
//! - `expected_end_date`, when set, is not earlier than `start_date`.
//! - Status changes are unrestricted: every status is reachable from every
//!   other one.

use crate::model::project::ProjectId;
use crate::model::team::TeamId;
use crate::model::today;
use crate::model::user::UserId;
use crate::model::validation::{check_date_order, check_required_text, ValidationErrors};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;

const TITLE_MAX_CHARS: usize = 200;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::NotStarted, Self::InProgress, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Task priority; lower rank sorts first.
///
/// Serialized as its numeric rank (`1` high, `2` medium, `3` low).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Self::High),
            2 => Some(Self::Medium),
            3 => Some(Self::Low),
            _ => None,
        }
    }
}

impl From<TaskPriority> for u8 {
    fn from(value: TaskPriority) -> Self {
        value.rank()
    }
}

impl TryFrom<u8> for TaskPriority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_rank(value).ok_or_else(|| format!("invalid task priority `{value}`"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub project_id: Option<ProjectId>,
    pub team_id: Option<TeamId>,
    pub responsible_id: Option<UserId>,
    pub start_date: NaiveDate,
    pub expected_end_date: Option<NaiveDate>,
}

impl Task {
    /// Creates an unlinked, unassigned, medium-priority task starting today.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            project_id: None,
            team_id: None,
            responsible_id: None,
            start_date: today(),
            expected_end_date: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_required_text("title", &self.title, TITLE_MAX_CHARS, &mut errors);
        check_date_order(self.start_date, self.expected_end_date, &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskPriority, TaskStatus};
    use chrono::NaiveDate;

    #[test]
    fn priority_serializes_as_rank() {
        assert_eq!(serde_json::to_string(&TaskPriority::High).unwrap(), "1");
        let low: TaskPriority = serde_json::from_str("3").unwrap();
        assert_eq!(low, TaskPriority::Low);
        assert!(serde_json::from_str::<TaskPriority>("7").is_err());
    }

    #[test]
    fn priority_orders_high_first() {
        let mut values = vec![TaskPriority::Low, TaskPriority::High, TaskPriority::Medium];
        values.sort();
        assert_eq!(
            values,
            vec![TaskPriority::High, TaskPriority::Medium, TaskPriority::Low]
        );
    }

    #[test]
    fn validate_rejects_end_before_start() {
        let mut task = Task::new("Write report");
        task.start_date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        task.expected_end_date = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert!(task.validate().unwrap_err().contains("expected_end_date"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(TaskStatus::parse("done"), None);
        assert_eq!(TaskStatus::parse("completed"), Some(TaskStatus::Completed));
    }
}
