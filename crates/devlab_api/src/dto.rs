//! Typed request bodies and list parameters.
//!
//! # Invariants
//! - Optional fields absent from a body keep stored values on update.
//! - For clearable fields an explicit `null` differs from absence: it is
//!   decoded as `Some(None)`.

use chrono::NaiveDate;
use devlab_core::{
    NewProject, NewTask, NewTeam, NewUser, ProfileChanges, ProjectChanges, ProjectId,
    ProjectListQuery, ProjectStatus, TaskChanges, TaskListQuery, TaskPriority, TaskStatus,
    TeamChanges, TeamId, UserId, UserRole,
};
use serde::{Deserialize, Deserializer};

/// Decodes a present field (including `null`) as `Some(..)`.
///
/// Pair with `#[serde(default)]` so that an absent field stays `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub password_hash: String,
    pub role: UserRole,
}

impl From<RegisterUserRequest> for NewUser {
    fn from(value: RegisterUserRequest) -> Self {
        let mut data = NewUser::new(value.username, value.email, value.name, value.role);
        data.password_hash = value.password_hash;
        data
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(value: UpdateProfileRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password_hash: value.password_hash,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_public: bool,
}

impl From<CreateProjectRequest> for NewProject {
    fn from(value: CreateProjectRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            status: value.status,
            start_date: value.start_date,
            expected_end_date: value.expected_end_date,
            is_public: value.is_public,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub expected_end_date: Option<Option<NaiveDate>>,
    pub is_public: Option<bool>,
}

impl From<UpdateProjectRequest> for ProjectChanges {
    fn from(value: UpdateProjectRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            status: value.status,
            start_date: value.start_date,
            expected_end_date: value.expected_end_date,
            is_public: value.is_public,
        }
    }
}

/// Body of participant and leader endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRefRequest {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorRequest {
    pub professor_id: UserId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub description: Option<String>,
    pub project_id: ProjectId,
    pub leader_id: Option<UserId>,
    #[serde(default)]
    pub member_ids: Vec<UserId>,
}

impl From<CreateTeamRequest> for NewTeam {
    fn from(value: CreateTeamRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            project_id: value.project_id,
            leader_id: value.leader_id,
            member_ids: value.member_ids,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl From<UpdateTeamRequest> for TeamChanges {
    fn from(value: UpdateTeamRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<ProjectId>,
    pub team_id: Option<TeamId>,
    pub responsible_id: Option<UserId>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(value: CreateTaskRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            status: value.status,
            priority: value.priority,
            project_id: value.project_id,
            team_id: value.team_id,
            responsible_id: value.responsible_id,
            start_date: value.start_date,
            expected_end_date: value.expected_end_date,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "double_option")]
    pub project_id: Option<Option<ProjectId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub team_id: Option<Option<TeamId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub responsible_id: Option<Option<UserId>>,
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub expected_end_date: Option<Option<NaiveDate>>,
}

impl From<UpdateTaskRequest> for TaskChanges {
    fn from(value: UpdateTaskRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            status: value.status,
            priority: value.priority,
            project_id: value.project_id,
            team_id: value.team_id,
            responsible_id: value.responsible_id,
            start_date: value.start_date,
            expected_end_date: value.expected_end_date,
        }
    }
}

/// `responsible_id` is checked by the handler so a missing value yields a
/// `detail` error rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignTaskRequest {
    pub responsible_id: Option<UserId>,
}

/// Raw status text; unknown values are rejected by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListParams {
    pub status: Option<ProjectStatus>,
    pub participant_id: Option<UserId>,
    pub search: Option<String>,
}

impl From<ProjectListParams> for ProjectListQuery {
    fn from(value: ProjectListParams) -> Self {
        Self {
            status: value.status,
            participant_id: value.participant_id,
            public_only: false,
            search: value.search,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamListParams {
    pub project_id: Option<ProjectId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListParams {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<ProjectId>,
    pub team_id: Option<TeamId>,
    pub responsible_id: Option<UserId>,
    pub search: Option<String>,
}

impl From<TaskListParams> for TaskListQuery {
    fn from(value: TaskListParams) -> Self {
        Self {
            status: value.status,
            priority: value.priority,
            project_id: value.project_id,
            team_id: value.team_id,
            responsible_id: value.responsible_id,
            search: value.search,
        }
    }
}
