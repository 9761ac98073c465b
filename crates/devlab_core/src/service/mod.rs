//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Consult the access policy before every mutation.
//! - Keep the boundary crate decoupled from storage details.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - Every failure maps onto one `ServiceError` kind.

use crate::model::project::{Project, ProjectId};
use crate::model::task::{Task, TaskId};
use crate::model::team::{Team, TeamId};
use crate::model::user::{User, UserId, UserSummary};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::team_repo::TeamRepository;
use crate::repo::user_repo::UserRepository;

pub mod error;
pub mod participation_service;
pub mod project_service;
pub mod task_service;
pub mod team_service;
pub mod user_service;

pub use error::{ServiceError, ServiceResult};

pub(crate) fn require_user<S: UserRepository>(store: &S, id: UserId) -> ServiceResult<User> {
    store
        .get_user(id)?
        .ok_or(ServiceError::NotFound { entity: "user", id })
}

pub(crate) fn require_project<S: ProjectRepository>(
    store: &S,
    id: ProjectId,
) -> ServiceResult<Project> {
    store.get_project(id)?.ok_or(ServiceError::NotFound {
        entity: "project",
        id,
    })
}

pub(crate) fn require_team<S: TeamRepository>(store: &S, id: TeamId) -> ServiceResult<Team> {
    store
        .get_team(id)?
        .ok_or(ServiceError::NotFound { entity: "team", id })
}

pub(crate) fn require_task<S: TaskRepository>(store: &S, id: TaskId) -> ServiceResult<Task> {
    store
        .get_task(id)?
        .ok_or(ServiceError::NotFound { entity: "task", id })
}

/// Summaries for `ids` in input order; ids with no user are skipped.
pub(crate) fn user_summaries<S: UserRepository>(
    store: &S,
    ids: impl IntoIterator<Item = UserId>,
) -> ServiceResult<Vec<UserSummary>> {
    let mut summaries = Vec::new();
    for id in ids {
        if let Some(user) = store.get_user(id)? {
            summaries.push(user.summary());
        }
    }
    Ok(summaries)
}
