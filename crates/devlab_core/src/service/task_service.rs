//! Task board use-case service.
//!
//! # Responsibility
//! - Create, edit and list tasks linked to projects and teams.
//! - Assign responsible users and move tasks between statuses.
//!
//! # Invariants
//! - When both links are set, the team belongs to the task's project.
//! - A responsible user supplied on create/update is an existing student
//!   and, for project tasks, an active participant of that project.
//! - `assign` only checks that the user exists; `change_status` accepts any
//!   transition between known statuses.

use crate::model::project::ProjectId;
use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::model::team::TeamId;
use crate::model::user::{User, UserId, UserRole};
use crate::policy::{can_write, is_role};
use crate::repo::task_repo::TaskListQuery;
use crate::repo::Store;
use crate::service::{require_task, require_user, ServiceError, ServiceResult};
use chrono::NaiveDate;
use log::info;

/// Creation payload.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<ProjectId>,
    pub team_id: Option<TeamId>,
    /// Defaults to the creating actor.
    pub responsible_id: Option<UserId>,
    /// Defaults to today.
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
}

/// Partial update; `None` keeps the stored value, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<Option<ProjectId>>,
    pub team_id: Option<Option<TeamId>>,
    pub responsible_id: Option<Option<UserId>>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<Option<NaiveDate>>,
}

/// Task board service facade.
pub struct TaskService<S: Store> {
    store: S,
}

impl<S: Store> TaskService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a task.
    ///
    /// Without an explicit responsible user the actor becomes responsible,
    /// whatever their role. A team given without a project lends the task
    /// its project.
    ///
    /// # Errors
    /// - `Validation` for blank titles, reversed dates, unknown or mismatched
    ///   links, and responsible users failing the student/participant rule.
    pub fn create(&self, actor: &User, data: NewTask) -> ServiceResult<Task> {
        let mut task = Task::new(data.title);
        task.description = data.description;
        task.status = data.status.unwrap_or_default();
        task.priority = data.priority.unwrap_or_default();
        task.project_id = data.project_id;
        task.team_id = data.team_id;
        if let Some(start_date) = data.start_date {
            task.start_date = start_date;
        }
        task.expected_end_date = data.expected_end_date;

        self.resolve_links(&mut task)?;
        match data.responsible_id {
            Some(responsible_id) => {
                self.check_responsible(task.project_id, responsible_id)?;
                task.responsible_id = Some(responsible_id);
            }
            None => task.responsible_id = Some(actor.id),
        }

        self.store.create_task(&task)?;
        info!(
            "event=task_create module=service status=ok task_id={} actor_id={}",
            task.id, actor.id
        );
        require_task(&self.store, task.id)
    }

    /// Applies a partial update. Staff or the responsible user only.
    pub fn update(&self, actor: &User, id: TaskId, changes: TaskChanges) -> ServiceResult<Task> {
        let mut task = require_task(&self.store, id)?;
        ensure_can_write(actor, &task)?;

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        if let Some(priority) = changes.priority {
            task.priority = priority;
        }
        if let Some(project_id) = changes.project_id {
            task.project_id = project_id;
        }
        if let Some(team_id) = changes.team_id {
            task.team_id = team_id;
        }
        if let Some(start_date) = changes.start_date {
            task.start_date = start_date;
        }
        if let Some(expected_end_date) = changes.expected_end_date {
            task.expected_end_date = expected_end_date;
        }

        self.resolve_links(&mut task)?;
        match changes.responsible_id {
            Some(Some(responsible_id)) => {
                self.check_responsible(task.project_id, responsible_id)?;
                task.responsible_id = Some(responsible_id);
            }
            Some(None) => task.responsible_id = None,
            None => {}
        }

        self.store.update_task(&task)?;
        info!(
            "event=task_update module=service status=ok task_id={} actor_id={}",
            id, actor.id
        );
        require_task(&self.store, id)
    }

    pub fn delete(&self, actor: &User, id: TaskId) -> ServiceResult<()> {
        let task = require_task(&self.store, id)?;
        ensure_can_write(actor, &task)?;
        self.store.delete_task(id)?;
        info!(
            "event=task_delete module=service status=ok task_id={} actor_id={}",
            id, actor.id
        );
        Ok(())
    }

    pub fn get(&self, id: TaskId) -> ServiceResult<Task> {
        require_task(&self.store, id)
    }

    /// Lists tasks by priority, then expected end date (unset last), then title.
    pub fn list(&self, query: &TaskListQuery) -> ServiceResult<Vec<Task>> {
        Ok(self.store.list_tasks(query)?)
    }

    /// Makes `user_id` responsible for the task.
    ///
    /// Any signed-in actor may reassign; neither role nor participation of
    /// the new responsible user is checked here.
    ///
    /// # Errors
    /// - `NotFound` for an unknown task or user.
    pub fn assign(&self, actor: &User, id: TaskId, user_id: UserId) -> ServiceResult<Task> {
        require_task(&self.store, id)?;
        let user = require_user(&self.store, user_id)?;

        self.store.set_task_responsible(id, Some(user.id))?;
        info!(
            "event=task_assign module=service status=ok task_id={} user_id={} actor_id={}",
            id, user.id, actor.id
        );
        require_task(&self.store, id)
    }

    /// Moves the task to `status`, given as its wire value.
    ///
    /// # Errors
    /// - `Validation` on `status` for blank or unknown values.
    pub fn change_status(&self, actor: &User, id: TaskId, status: &str) -> ServiceResult<Task> {
        require_task(&self.store, id)?;
        let status = status.trim();
        if status.is_empty() {
            return Err(ServiceError::invalid("status", "status is required"));
        }
        let status = TaskStatus::parse(status)
            .ok_or_else(|| ServiceError::invalid("status", format!("invalid status `{status}`")))?;

        self.store.set_task_status(id, status)?;
        info!(
            "event=task_change_status module=service status=ok task_id={} new_status={} actor_id={}",
            id,
            status.as_str(),
            actor.id
        );
        require_task(&self.store, id)
    }

    /// Checks that linked records exist and agree with each other.
    fn resolve_links(&self, task: &mut Task) -> ServiceResult<()> {
        if let Some(project_id) = task.project_id {
            if self.store.get_project(project_id)?.is_none() {
                return Err(ServiceError::invalid(
                    "project_id",
                    format!("project `{project_id}` does not exist"),
                ));
            }
        }

        if let Some(team_id) = task.team_id {
            let team = self.store.get_team(team_id)?.ok_or_else(|| {
                ServiceError::invalid("team_id", format!("team `{team_id}` does not exist"))
            })?;
            match task.project_id {
                None => task.project_id = Some(team.project_id),
                Some(project_id) if project_id != team.project_id => {
                    return Err(ServiceError::invalid(
                        "team_id",
                        "team does not belong to the task's project",
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn check_responsible(
        &self,
        project_id: Option<ProjectId>,
        responsible_id: UserId,
    ) -> ServiceResult<()> {
        let user = self
            .store
            .get_user(responsible_id)?
            .ok_or_else(|| ServiceError::invalid("responsible_id", "user not found"))?;
        if !is_role(&user, UserRole::Student) {
            return Err(ServiceError::invalid(
                "responsible_id",
                "only students can be responsible for tasks",
            ));
        }
        if let Some(project_id) = project_id {
            if !self.store.is_active_participant(project_id, user.id)? {
                return Err(ServiceError::invalid(
                    "responsible_id",
                    "the responsible user must be an active participant of the project",
                ));
            }
        }
        Ok(())
    }
}

fn ensure_can_write(actor: &User, task: &Task) -> ServiceResult<()> {
    if can_write(actor, task) {
        Ok(())
    } else {
        Err(ServiceError::forbidden(
            "only the responsible user or staff can change this task",
        ))
    }
}
