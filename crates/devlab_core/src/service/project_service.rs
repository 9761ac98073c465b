//! Project registry use-case service.
//!
//! # Responsibility
//! - Create, edit, list and delete projects under creator ownership.
//! - Assign advising professors and build the per-project dashboard.
//!
//! # Invariants
//! - Partial updates are merged into the stored record before validation, so
//!   date ordering is re-checked on every save.
//! - Advisor auto-enrolment is best-effort; its failure never fails the
//!   advisor assignment.

use crate::model::project::{Project, ProjectId, ProjectStatus};
use crate::model::team::TeamId;
use crate::model::today;
use crate::model::user::{User, UserId, UserRole, UserSummary};
use crate::policy::{can_create_project, can_read_project, can_write, is_creator, is_role};
use crate::repo::project_repo::ProjectListQuery;
use crate::repo::team_repo::TeamListQuery;
use crate::repo::Store;
use crate::service::{require_project, require_user, user_summaries, ServiceError, ServiceResult};
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// Creation payload.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: Option<ProjectStatus>,
    /// Defaults to today.
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    pub is_public: bool,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    /// `Some(None)` clears the expected end date.
    pub expected_end_date: Option<Option<NaiveDate>>,
    pub is_public: Option<bool>,
}

/// Team entry of a project dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct TeamOverview {
    pub id: TeamId,
    pub name: String,
    pub leader: Option<UserSummary>,
    pub members: Vec<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardCounts {
    pub participants: usize,
    pub teams: usize,
    pub tasks: u32,
    /// Task count per status; every status is present.
    pub tasks_by_status: BTreeMap<&'static str, u32>,
}

/// Aggregate read of one project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDashboard {
    pub project: Project,
    pub creator: Option<UserSummary>,
    pub advisor: Option<UserSummary>,
    pub leader: Option<UserSummary>,
    pub participants: Vec<UserSummary>,
    pub teams: Vec<TeamOverview>,
    pub counts: DashboardCounts,
}

/// Project registry service facade.
pub struct ProjectService<S: Store> {
    store: S,
}

impl<S: Store> ProjectService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a project owned by `creator`.
    ///
    /// # Errors
    /// - `Permission` for visitor accounts.
    /// - `Validation` for blank names or reversed dates.
    pub fn create(&self, creator: &User, data: NewProject) -> ServiceResult<Project> {
        if !can_create_project(creator) {
            return Err(ServiceError::forbidden("visitors cannot create projects"));
        }

        let mut project = Project::new(data.name, creator.id);
        project.description = data.description;
        project.status = data.status.unwrap_or_default();
        project.start_date = data.start_date.unwrap_or_else(today);
        project.expected_end_date = data.expected_end_date;
        project.is_public = data.is_public;

        self.store.create_project(&project)?;
        info!(
            "event=project_create module=service status=ok project_id={} creator_id={}",
            project.id, creator.id
        );
        self.require(project.id)
    }

    /// Applies a partial update. Only the creator may edit.
    pub fn update(
        &self,
        actor: &User,
        id: ProjectId,
        changes: ProjectChanges,
    ) -> ServiceResult<Project> {
        let mut project = self.require(id)?;
        if !is_creator(actor, &project) {
            return Err(ServiceError::forbidden(
                "only the project creator can edit it",
            ));
        }

        if let Some(name) = changes.name {
            project.name = name;
        }
        if let Some(description) = changes.description {
            project.description = description;
        }
        if let Some(status) = changes.status {
            project.status = status;
        }
        if let Some(start_date) = changes.start_date {
            project.start_date = start_date;
        }
        if let Some(expected_end_date) = changes.expected_end_date {
            project.expected_end_date = expected_end_date;
        }
        if let Some(is_public) = changes.is_public {
            project.is_public = is_public;
        }

        self.store.update_project(&project)?;
        info!(
            "event=project_update module=service status=ok project_id={} actor_id={}",
            project.id, actor.id
        );
        self.require(id)
    }

    /// Reads one project; anonymous callers only see public ones.
    pub fn get(&self, actor: Option<&User>, id: ProjectId) -> ServiceResult<Project> {
        let project = self.require(id)?;
        if !can_read_project(actor, &project) {
            return Err(ServiceError::Unauthenticated);
        }
        Ok(project)
    }

    /// Lists projects ordered by start date, then name.
    ///
    /// Anonymous callers are restricted to public projects.
    pub fn list(
        &self,
        actor: Option<&User>,
        mut query: ProjectListQuery,
    ) -> ServiceResult<Vec<Project>> {
        if actor.is_none() {
            query.public_only = true;
        }
        Ok(self.store.list_projects(&query)?)
    }

    pub fn list_public(&self) -> ServiceResult<Vec<Project>> {
        Ok(self.store.list_projects(&ProjectListQuery {
            public_only: true,
            ..ProjectListQuery::default()
        })?)
    }

    /// Deletes a project together with its participations, teams and tasks.
    pub fn delete(&self, actor: &User, id: ProjectId) -> ServiceResult<()> {
        let project = self.require(id)?;
        if !can_write(actor, &project) {
            return Err(ServiceError::forbidden(
                "only the project creator can delete it",
            ));
        }
        self.store.delete_project(id)?;
        info!(
            "event=project_delete module=service status=ok project_id={} actor_id={}",
            id, actor.id
        );
        Ok(())
    }

    /// Sets the advising professor and enrols them when not yet recorded.
    ///
    /// # Errors
    /// - `Permission` unless `actor` created the project and is a coordinator.
    /// - `NotFound` for an unknown professor id.
    /// - `Validation` on `professor_id` when the target is not a professor.
    pub fn set_advisor(
        &self,
        actor: &User,
        id: ProjectId,
        professor_id: UserId,
    ) -> ServiceResult<Project> {
        let project = self.require(id)?;
        if !is_creator(actor, &project) || !is_role(actor, UserRole::Coordinator) {
            return Err(ServiceError::forbidden(
                "only the coordinator who created the project can set its advisor",
            ));
        }

        let professor = require_user(&self.store, professor_id)?;
        if !is_role(&professor, UserRole::Professor) {
            return Err(ServiceError::invalid(
                "professor_id",
                "the selected user is not a professor",
            ));
        }

        self.store.set_project_advisor(id, Some(professor.id))?;
        info!(
            "event=project_set_advisor module=service status=ok project_id={} advisor_id={}",
            id, professor.id
        );

        match self.store.ensure_participation(id, professor.id, today()) {
            Ok(inserted) => info!(
                "event=advisor_enrol module=service status={} project_id={} user_id={}",
                if inserted { "ok" } else { "skipped" },
                id,
                professor.id
            ),
            Err(err) => warn!(
                "event=advisor_enrol module=service status=error project_id={} user_id={} error={}",
                id, professor.id, err
            ),
        }

        self.require(id)
    }

    /// Aggregate read: people, teams and task counters of one project.
    pub fn dashboard(&self, actor: Option<&User>, id: ProjectId) -> ServiceResult<ProjectDashboard> {
        let project = self.get(actor, id)?;

        let participations = self.store.list_participations(id, false)?;
        let leader_id = participations
            .iter()
            .find(|participation| participation.is_leader)
            .map(|participation| participation.user_id);
        let participants =
            user_summaries(&self.store, participations.iter().map(|p| p.user_id))?;

        let teams = self.store.list_teams(&TeamListQuery {
            project_id: Some(id),
            ..TeamListQuery::default()
        })?;
        let mut team_overviews = Vec::with_capacity(teams.len());
        for team in teams {
            team_overviews.push(TeamOverview {
                id: team.id,
                leader: self.summary_of(team.leader_id)?,
                members: user_summaries(&self.store, team.member_ids.iter().copied())?,
                name: team.name,
            });
        }

        let tasks_by_status = self.store.count_tasks_by_status(id)?;
        let tasks = tasks_by_status.values().sum();
        let counts = DashboardCounts {
            participants: participants.len(),
            teams: team_overviews.len(),
            tasks,
            tasks_by_status,
        };

        Ok(ProjectDashboard {
            creator: self.summary_of(Some(project.creator_id))?,
            advisor: self.summary_of(project.advisor_id)?,
            leader: self.summary_of(leader_id)?,
            project,
            participants,
            teams: team_overviews,
            counts,
        })
    }

    fn require(&self, id: ProjectId) -> ServiceResult<Project> {
        require_project(&self.store, id)
    }

    fn summary_of(&self, id: Option<UserId>) -> ServiceResult<Option<UserSummary>> {
        match id {
            Some(id) => Ok(self.store.get_user(id)?.map(|user| user.summary())),
            None => Ok(None),
        }
    }
}
