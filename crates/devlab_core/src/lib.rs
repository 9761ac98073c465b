//! Core domain logic for DevLab.
//! This crate is the single source of truth for project, participation,
//! team and task invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::participation::{Participation, ParticipationId};
pub use model::project::{Project, ProjectId, ProjectStatus};
pub use model::task::{Task, TaskId, TaskPriority, TaskStatus};
pub use model::team::{Team, TeamId};
pub use model::user::{User, UserId, UserRole, UserSummary};
pub use model::validation::{ValidationErrors, NON_FIELD_ERRORS};
pub use repo::participation_repo::{EnrollOutcome, ParticipationRepository};
pub use repo::project_repo::{ProjectListQuery, ProjectRepository};
pub use repo::task_repo::{TaskListQuery, TaskRepository};
pub use repo::team_repo::{TeamListQuery, TeamRepository};
pub use repo::user_repo::UserRepository;
pub use repo::{RepoError, RepoResult, SqliteStore, Store};
pub use service::participation_service::ParticipationService;
pub use service::project_service::{
    DashboardCounts, NewProject, ProjectChanges, ProjectDashboard, ProjectService, TeamOverview,
};
pub use service::task_service::{NewTask, TaskChanges, TaskService};
pub use service::team_service::{NewTeam, TeamChanges, TeamService};
pub use service::user_service::{NewUser, ProfileChanges, UserService};
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for smoke checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
