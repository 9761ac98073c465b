//! Project registry repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `create_project`/`update_project` validate the record first.
//! - `set_project_advisor` writes only the advisor column and skips record
//!   validation.
//! - Listing order is `start_date ASC, name ASC, id ASC`.

use crate::model::project::{Project, ProjectId, ProjectStatus};
use crate::model::user::UserId;
use crate::repo::{
    bool_to_int, contains_pattern, parse_bool, parse_optional_uuid, parse_uuid, RepoError,
    RepoResult, SqliteStore,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    status,
    start_date,
    expected_end_date,
    creator_id,
    advisor_id,
    is_public
FROM projects";

/// Filter options for listing projects.
#[derive(Debug, Clone, Default)]
pub struct ProjectListQuery {
    pub status: Option<ProjectStatus>,
    /// Only projects where this user is an active participant.
    pub participant_id: Option<UserId>,
    pub public_only: bool,
    /// Substring match over name, description and status.
    pub search: Option<String>,
}

/// Repository interface for projects.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    /// Narrow writer for the advisor reference.
    fn set_project_advisor(&self, id: ProjectId, advisor_id: Option<UserId>) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    /// Deletes a project together with its participations, teams and tasks.
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

impl ProjectRepository for SqliteStore<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn().execute(
            "INSERT INTO projects (
                id,
                name,
                description,
                status,
                start_date,
                expected_end_date,
                creator_id,
                advisor_id,
                is_public
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                project.id.to_string(),
                project.name.trim(),
                project.description.as_str(),
                project.status.as_str(),
                project.start_date,
                project.expected_end_date,
                project.creator_id.to_string(),
                project.advisor_id.map(|id| id.to_string()),
                bool_to_int(project.is_public),
            ],
        )?;

        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let changed = self.conn().execute(
            "UPDATE projects
             SET
                name = ?2,
                description = ?3,
                status = ?4,
                start_date = ?5,
                expected_end_date = ?6,
                advisor_id = ?7,
                is_public = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                project.id.to_string(),
                project.name.trim(),
                project.description.as_str(),
                project.status.as_str(),
                project.start_date,
                project.expected_end_date,
                project.advisor_id.map(|id| id.to_string()),
                bool_to_int(project.is_public),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id: project.id,
            });
        }
        Ok(())
    }

    fn set_project_advisor(&self, id: ProjectId, advisor_id: Option<UserId>) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE projects
             SET
                advisor_id = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), advisor_id.map(|value| value.to_string())],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(participant_id) = query.participant_id {
            sql.push_str(
                " AND EXISTS(
                    SELECT 1
                    FROM participations p
                    WHERE p.project_id = projects.id
                      AND p.user_id = ?
                      AND p.is_active = 1
                )",
            );
            bind_values.push(Value::Text(participant_id.to_string()));
        }

        if query.public_only {
            sql.push_str(" AND is_public = 1");
        }

        if let Some(pattern) = query.search.as_deref().and_then(contains_pattern) {
            sql.push_str(
                " AND (name LIKE ? ESCAPE '\\'
                    OR description LIKE ? ESCAPE '\\'
                    OR status LIKE ? ESCAPE '\\')",
            );
            bind_values.extend(std::iter::repeat(Value::Text(pattern)).take(3));
        }

        sql.push_str(" ORDER BY start_date ASC, name ASC, id ASC");

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;
    let creator_text: String = row.get("creator_id")?;

    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid project status `{status_text}` in projects.status"
        ))
    })?;

    let project = Project {
        id: parse_uuid(&id_text, "projects.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        status,
        start_date: row.get("start_date")?,
        expected_end_date: row.get("expected_end_date")?,
        creator_id: parse_uuid(&creator_text, "projects.creator_id")?,
        advisor_id: parse_optional_uuid(row.get("advisor_id")?, "projects.advisor_id")?,
        is_public: parse_bool(row.get("is_public")?, "projects.is_public")?,
    };
    project.validate()?;
    Ok(project)
}
