//! Task board repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `create_task`/`update_task` validate the record first.
//! - `set_task_status`/`set_task_responsible` write one column and skip
//!   record validation.
//! - Listing order is `priority ASC`, then expected end date (unset last),
//!   then `title ASC`.

use crate::model::project::ProjectId;
use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::model::team::TeamId;
use crate::model::user::UserId;
use crate::repo::{
    contains_pattern, parse_optional_uuid, parse_uuid, RepoError, RepoResult, SqliteStore,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use std::collections::BTreeMap;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    status,
    priority,
    project_id,
    team_id,
    responsible_id,
    start_date,
    expected_end_date
FROM tasks";

/// Filter options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<ProjectId>,
    pub team_id: Option<TeamId>,
    pub responsible_id: Option<UserId>,
    /// Substring match over title and description.
    pub search: Option<String>,
}

/// Repository interface for tasks.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    /// Narrow writer for the status column.
    fn set_task_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<()>;
    /// Narrow writer for the responsible reference.
    fn set_task_responsible(&self, id: TaskId, responsible_id: Option<UserId>) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Task counts per status for one project; every status is present.
    fn count_tasks_by_status(&self, project_id: ProjectId)
        -> RepoResult<BTreeMap<&'static str, u32>>;
}

impl TaskRepository for SqliteStore<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn().execute(
            "INSERT INTO tasks (
                id,
                title,
                description,
                status,
                priority,
                project_id,
                team_id,
                responsible_id,
                start_date,
                expected_end_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                task.id.to_string(),
                task.title.trim(),
                task.description.as_str(),
                task.status.as_str(),
                task.priority.rank(),
                task.project_id.map(|id| id.to_string()),
                task.team_id.map(|id| id.to_string()),
                task.responsible_id.map(|id| id.to_string()),
                task.start_date,
                task.expected_end_date,
            ],
        )?;

        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn().execute(
            "UPDATE tasks
             SET
                title = ?2,
                description = ?3,
                status = ?4,
                priority = ?5,
                project_id = ?6,
                team_id = ?7,
                responsible_id = ?8,
                start_date = ?9,
                expected_end_date = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                task.id.to_string(),
                task.title.trim(),
                task.description.as_str(),
                task.status.as_str(),
                task.priority.rank(),
                task.project_id.map(|id| id.to_string()),
                task.team_id.map(|id| id.to_string()),
                task.responsible_id.map(|id| id.to_string()),
                task.start_date,
                task.expected_end_date,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "task",
                id: task.id,
            });
        }
        Ok(())
    }

    fn set_task_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE tasks
             SET status = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), status.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "task", id });
        }
        Ok(())
    }

    fn set_task_responsible(&self, id: TaskId, responsible_id: Option<UserId>) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE tasks
             SET responsible_id = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), responsible_id.map(|value| value.to_string())],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "task", id });
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(priority) = query.priority {
            sql.push_str(" AND priority = ?");
            bind_values.push(Value::Integer(i64::from(priority.rank())));
        }
        if let Some(project_id) = query.project_id {
            sql.push_str(" AND project_id = ?");
            bind_values.push(Value::Text(project_id.to_string()));
        }
        if let Some(team_id) = query.team_id {
            sql.push_str(" AND team_id = ?");
            bind_values.push(Value::Text(team_id.to_string()));
        }
        if let Some(responsible_id) = query.responsible_id {
            sql.push_str(" AND responsible_id = ?");
            bind_values.push(Value::Text(responsible_id.to_string()));
        }
        if let Some(pattern) = query.search.as_deref().and_then(contains_pattern) {
            sql.push_str(" AND (title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\')");
            bind_values.extend(std::iter::repeat(Value::Text(pattern)).take(2));
        }

        sql.push_str(
            " ORDER BY priority ASC,
                expected_end_date IS NULL ASC,
                expected_end_date ASC,
                title ASC,
                id ASC",
        );

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "task", id });
        }
        Ok(())
    }

    fn count_tasks_by_status(
        &self,
        project_id: ProjectId,
    ) -> RepoResult<BTreeMap<&'static str, u32>> {
        let mut counts: BTreeMap<&'static str, u32> = TaskStatus::ALL
            .iter()
            .map(|status| (status.as_str(), 0))
            .collect();

        let mut stmt = self.conn().prepare(
            "SELECT status, COUNT(*)
             FROM tasks
             WHERE project_id = ?1
             GROUP BY status;",
        )?;
        let mut rows = stmt.query([project_id.to_string()])?;
        while let Some(row) = rows.next()? {
            let status_text: String = row.get(0)?;
            let count: u32 = row.get(1)?;
            let status = TaskStatus::parse(&status_text).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
            })?;
            counts.insert(status.as_str(), count);
        }
        Ok(counts)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    let priority_rank: u8 = row.get("priority")?;
    let priority = TaskPriority::from_rank(priority_rank).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid task priority `{priority_rank}` in tasks.priority"
        ))
    })?;

    let task = Task {
        id: parse_uuid(&id_text, "tasks.id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        priority,
        project_id: parse_optional_uuid(row.get("project_id")?, "tasks.project_id")?,
        team_id: parse_optional_uuid(row.get("team_id")?, "tasks.team_id")?,
        responsible_id: parse_optional_uuid(row.get("responsible_id")?, "tasks.responsible_id")?,
        start_date: row.get("start_date")?,
        expected_end_date: row.get("expected_end_date")?,
    };
    task.validate()?;
    Ok(task)
}
