//! Participation ledger use-case service.
//!
//! # Responsibility
//! - Enrol and withdraw project participants.
//! - Move the single project-leader flag between active participants.
//!
//! # Invariants
//! - Only students are enrolled through this service; advisors arrive via
//!   `ProjectService::set_advisor`.
//! - At most one participation per project carries `is_leader`.
//! - Withdrawing a participant also drops their team roles in that project.

use crate::model::participation::Participation;
use crate::model::project::{Project, ProjectId};
use crate::model::today;
use crate::model::user::{User, UserId, UserRole};
use crate::policy::{can_read_project, is_creator, is_role};
use crate::repo::participation_repo::EnrollOutcome;
use crate::repo::Store;
use crate::service::{require_project, require_user, ServiceError, ServiceResult};
use log::info;

/// Participation ledger service facade.
pub struct ParticipationService<S: Store> {
    store: S,
}

impl<S: Store> ParticipationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Enrols a student in a project.
    ///
    /// An inactive participation for the pair is reactivated in place.
    ///
    /// # Errors
    /// - `Permission` unless `actor` created the project.
    /// - `NotFound` for an unknown user.
    /// - `Validation` on `user_id` for non-students or an already active pair.
    pub fn add_participant(
        &self,
        actor: &User,
        project_id: ProjectId,
        user_id: UserId,
    ) -> ServiceResult<Participation> {
        let project = require_project(&self.store, project_id)?;
        if !is_creator(actor, &project) {
            return Err(ServiceError::forbidden(
                "only the project creator can add participants",
            ));
        }

        let user = require_user(&self.store, user_id)?;
        if !is_role(&user, UserRole::Student) {
            return Err(ServiceError::invalid(
                "user_id",
                "only students can be added as participants",
            ));
        }

        match self
            .store
            .enroll_participant(project_id, user_id, today())?
        {
            EnrollOutcome::AlreadyActive(_) => Err(ServiceError::invalid(
                "user_id",
                "user already participates in this project",
            )),
            EnrollOutcome::Created(participation) | EnrollOutcome::Reactivated(participation) => {
                info!(
                    "event=participant_add module=service status=ok project_id={} user_id={}",
                    project_id, user_id
                );
                Ok(participation)
            }
        }
    }

    /// Withdraws an active participant, keeping the row as history.
    pub fn remove_participant(
        &self,
        actor: &User,
        project_id: ProjectId,
        user_id: UserId,
    ) -> ServiceResult<Participation> {
        let project = require_project(&self.store, project_id)?;
        if !is_creator(actor, &project) {
            return Err(ServiceError::forbidden(
                "only the project creator can remove participants",
            ));
        }

        let participation = self
            .store
            .withdraw_participant(project_id, user_id, today())?;
        info!(
            "event=participant_remove module=service status=ok project_id={} user_id={}",
            project_id, user_id
        );
        Ok(participation)
    }

    /// Makes `user_id` the single leader of the project.
    ///
    /// Calling it again for the current leader changes nothing.
    ///
    /// # Errors
    /// - `Permission` unless `actor` is the coordinator who created the project.
    /// - `NotFound` for an unknown user.
    /// - `Validation` on `user_id` when the target is not a student or not an
    ///   active participant.
    pub fn set_leader(
        &self,
        actor: &User,
        project_id: ProjectId,
        user_id: UserId,
    ) -> ServiceResult<Participation> {
        let project = require_project(&self.store, project_id)?;
        ensure_coordinating_creator(actor, &project)?;

        let user = require_user(&self.store, user_id)?;
        if !is_role(&user, UserRole::Student) {
            return Err(ServiceError::invalid(
                "user_id",
                "the project leader must be a student",
            ));
        }
        if !self.store.is_active_participant(project_id, user_id)? {
            return Err(ServiceError::invalid(
                "user_id",
                "the project leader must be an active participant",
            ));
        }

        self.store.set_project_leader(project_id, user_id)?;
        info!(
            "event=project_set_leader module=service status=ok project_id={} user_id={}",
            project_id, user_id
        );

        self.store
            .project_leader(project_id)?
            .ok_or(ServiceError::NotFound {
                entity: "active participation",
                id: user_id,
            })
    }

    /// Lists participations newest entry first.
    pub fn list_participants(
        &self,
        actor: Option<&User>,
        project_id: ProjectId,
        include_inactive: bool,
    ) -> ServiceResult<Vec<Participation>> {
        let project = require_project(&self.store, project_id)?;
        if !can_read_project(actor, &project) {
            return Err(ServiceError::Unauthenticated);
        }
        Ok(self
            .store
            .list_participations(project_id, include_inactive)?)
    }

    pub fn project_leader(&self, project_id: ProjectId) -> ServiceResult<Option<Participation>> {
        require_project(&self.store, project_id)?;
        Ok(self.store.project_leader(project_id)?)
    }
}

fn ensure_coordinating_creator(actor: &User, project: &Project) -> ServiceResult<()> {
    if is_creator(actor, project) && is_role(actor, UserRole::Coordinator) {
        Ok(())
    } else {
        Err(ServiceError::forbidden(
            "only the coordinator who created the project can set its leader",
        ))
    }
}
