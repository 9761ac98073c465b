//! Team registry use-case service.
//!
//! # Responsibility
//! - Create and maintain teams inside a project.
//! - Keep leaders and members drawn from the project's active participants.
//!
//! # Invariants
//! - Team writes require `can_manage_team` on the owning project.
//! - A user leads at most one team system-wide; a second leadership is
//!   rejected with `Conflict`, never silently moved.
//! - The leader is always recorded as a member when assigned.

use crate::model::project::{Project, ProjectId};
use crate::model::team::{Team, TeamId};
use crate::model::user::{User, UserId, UserRole};
use crate::policy::{can_manage_team, can_view_team, is_role};
use crate::repo::team_repo::TeamListQuery;
use crate::repo::Store;
use crate::service::{require_project, require_team, require_user, ServiceError, ServiceResult};
use log::info;

/// Creation payload.
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub description: Option<String>,
    pub project_id: ProjectId,
    pub leader_id: Option<UserId>,
    pub member_ids: Vec<UserId>,
}

impl NewTeam {
    pub fn new(name: impl Into<String>, project_id: ProjectId) -> Self {
        Self {
            name: name.into(),
            description: None,
            project_id,
            leader_id: None,
            member_ids: Vec::new(),
        }
    }
}

/// Partial update of descriptive fields.
#[derive(Debug, Clone, Default)]
pub struct TeamChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}

/// Team registry service facade.
pub struct TeamService<S: Store> {
    store: S,
}

impl<S: Store> TeamService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a team with optional leader and members.
    ///
    /// # Errors
    /// - `Permission` without team management rights on the project.
    /// - `Validation` on `leader_id`/`member_ids` for users who are not active
    ///   participants of the project.
    /// - `Conflict` on `name` for a duplicate name in the project, or on
    ///   `leader_id` when the leader already leads another team.
    pub fn create(&self, actor: &User, data: NewTeam) -> ServiceResult<Team> {
        let project = require_project(&self.store, data.project_id)?;
        self.ensure_can_manage(actor, &project)?;

        let mut team = Team::new(data.name, project.id);
        team.description = data.description;

        for member_id in &data.member_ids {
            self.require_participant(project.id, *member_id, "member_ids")?;
        }
        team.member_ids = data.member_ids;

        if let Some(leader_id) = data.leader_id {
            self.require_participant(project.id, leader_id, "leader_id")?;
            if self.store.team_led_by(leader_id)?.is_some() {
                return Err(leader_conflict());
            }
            team.leader_id = Some(leader_id);
            team.member_ids.push(leader_id);
        }
        team.member_ids.sort();
        team.member_ids.dedup();

        self.store.create_team(&team)?;
        info!(
            "event=team_create module=service status=ok team_id={} project_id={} members={}",
            team.id,
            project.id,
            team.member_ids.len()
        );
        require_team(&self.store, team.id)
    }

    /// Renames or re-describes a team.
    pub fn update(&self, actor: &User, id: TeamId, changes: TeamChanges) -> ServiceResult<Team> {
        let (mut team, project) = self.load(id)?;
        self.ensure_can_manage(actor, &project)?;

        if let Some(name) = changes.name {
            team.name = name;
        }
        if let Some(description) = changes.description {
            team.description = description;
        }

        self.store.update_team(&team)?;
        info!(
            "event=team_update module=service status=ok team_id={} actor_id={}",
            id, actor.id
        );
        require_team(&self.store, id)
    }

    /// Deletes a team together with its tasks and member rows.
    pub fn delete(&self, actor: &User, id: TeamId) -> ServiceResult<()> {
        let (_, project) = self.load(id)?;
        self.ensure_can_manage(actor, &project)?;
        self.store.delete_team(id)?;
        info!(
            "event=team_delete module=service status=ok team_id={} actor_id={}",
            id, actor.id
        );
        Ok(())
    }

    /// Reads one team visible to `actor`.
    pub fn get(&self, actor: &User, id: TeamId) -> ServiceResult<Team> {
        let (team, project) = self.load(id)?;
        let is_participant = self.store.is_active_participant(project.id, actor.id)?;
        if !can_view_team(actor, &project, is_participant) {
            return Err(ServiceError::forbidden(
                "you do not take part in this team's project",
            ));
        }
        Ok(team)
    }

    /// Lists teams visible to `actor`, optionally within one project.
    pub fn list(&self, actor: &User, project_id: Option<ProjectId>) -> ServiceResult<Vec<Team>> {
        let sees_everything = actor.is_staff || is_role(actor, UserRole::Coordinator);
        let query = TeamListQuery {
            project_id,
            visible_to: if sees_everything {
                None
            } else {
                Some(actor.id)
            },
        };
        Ok(self.store.list_teams(&query)?)
    }

    /// Assigns the team leader and records them as a member.
    ///
    /// Re-assigning the current leader is a no-op.
    ///
    /// # Errors
    /// - `NotFound` for an unknown user.
    /// - `Validation` on `user_id` when the user is not an active participant.
    /// - `Conflict` on `leader_id` when the user leads a different team.
    pub fn set_leader(&self, actor: &User, id: TeamId, user_id: UserId) -> ServiceResult<Team> {
        let (team, project) = self.load(id)?;
        self.ensure_can_manage(actor, &project)?;
        self.require_participant(project.id, user_id, "user_id")?;

        if team.leader_id == Some(user_id) {
            info!(
                "event=team_set_leader module=service status=skipped team_id={} user_id={}",
                id, user_id
            );
            return Ok(team);
        }
        if let Some(led) = self.store.team_led_by(user_id)? {
            if led != id {
                return Err(leader_conflict());
            }
        }

        self.store.set_team_leader(id, user_id)?;
        info!(
            "event=team_set_leader module=service status=ok team_id={} user_id={}",
            id, user_id
        );
        require_team(&self.store, id)
    }

    /// Adds an active participant to the team. Existing members are kept as is.
    pub fn add_member(&self, actor: &User, id: TeamId, user_id: UserId) -> ServiceResult<Team> {
        let (_, project) = self.load(id)?;
        self.ensure_can_manage(actor, &project)?;
        self.require_participant(project.id, user_id, "user_id")?;

        let inserted = self.store.add_team_member(id, user_id)?;
        info!(
            "event=team_add_member module=service status={} team_id={} user_id={}",
            if inserted { "ok" } else { "skipped" },
            id,
            user_id
        );
        require_team(&self.store, id)
    }

    /// Removes a member. Removing a non-member changes nothing and the leader
    /// field is left untouched.
    pub fn remove_member(&self, actor: &User, id: TeamId, user_id: UserId) -> ServiceResult<Team> {
        let (_, project) = self.load(id)?;
        self.ensure_can_manage(actor, &project)?;

        let removed = self.store.remove_team_member(id, user_id)?;
        info!(
            "event=team_remove_member module=service status={} team_id={} user_id={}",
            if removed { "ok" } else { "skipped" },
            id,
            user_id
        );
        require_team(&self.store, id)
    }

    fn load(&self, id: TeamId) -> ServiceResult<(Team, Project)> {
        let team = require_team(&self.store, id)?;
        let project = require_project(&self.store, team.project_id)?;
        Ok((team, project))
    }

    fn ensure_can_manage(&self, actor: &User, project: &Project) -> ServiceResult<()> {
        if can_manage_team(actor, project) {
            Ok(())
        } else {
            Err(ServiceError::forbidden(
                "only coordinators or the project creator can manage teams",
            ))
        }
    }

    fn require_participant(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        field: &str,
    ) -> ServiceResult<()> {
        require_user(&self.store, user_id)?;
        if !self.store.is_active_participant(project_id, user_id)? {
            return Err(ServiceError::invalid(
                field,
                "user must be an active participant of the team's project",
            ));
        }
        Ok(())
    }
}

fn leader_conflict() -> ServiceError {
    ServiceError::conflict("leader_id", "user already leads another team")
}
