//! Team registry repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `(project_id, name)` and `leader_id` are unique; collisions surface as
//!   `RepoError::Conflict` on `name` / `leader_id`.
//! - A team row and its member rows are written in one transaction.
//! - Setting a leader also records them as a member.
//! - Leaders and members are re-checked as active participants of the
//!   team's project inside the write transaction.
//! - Member ids are always returned sorted.

use crate::model::project::ProjectId;
use crate::model::team::{Team, TeamId};
use crate::model::user::UserId;
use crate::model::validation::ValidationErrors;
use crate::repo::participation_repo::is_active_participant_on;
use crate::repo::{
    map_unique_violation, parse_optional_uuid, parse_uuid, RepoError, RepoResult, SqliteStore,
    UniqueRule,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const TEAM_SELECT_SQL: &str = "SELECT
    t.id AS id,
    t.name AS name,
    t.description AS description,
    t.project_id AS project_id,
    t.leader_id AS leader_id,
    t.created_on AS created_on
FROM teams t
INNER JOIN projects p ON p.id = t.project_id";

const NOT_A_PARTICIPANT: &str = "user must be an active participant of the team's project";

const TEAM_UNIQUE_RULES: &[UniqueRule] = &[
    UniqueRule {
        columns: "teams.project_id, teams.name",
        field: "name",
        message: "a team with this name already exists in the project",
    },
    UniqueRule {
        columns: "teams.leader_id",
        field: "leader_id",
        message: "user already leads another team",
    },
];

/// Filter options for listing teams.
#[derive(Debug, Clone, Default)]
pub struct TeamListQuery {
    pub project_id: Option<ProjectId>,
    /// Only teams of projects this user created or actively takes part in.
    pub visible_to: Option<UserId>,
}

/// Repository interface for teams and their member sets.
pub trait TeamRepository {
    /// Inserts the team together with its `member_ids`.
    fn create_team(&self, team: &Team) -> RepoResult<TeamId>;
    /// Updates name and description only.
    fn update_team(&self, team: &Team) -> RepoResult<()>;
    fn get_team(&self, id: TeamId) -> RepoResult<Option<Team>>;
    /// Lists teams ordered by project name, then team name.
    fn list_teams(&self, query: &TeamListQuery) -> RepoResult<Vec<Team>>;
    fn delete_team(&self, id: TeamId) -> RepoResult<()>;
    fn set_team_leader(&self, id: TeamId, leader_id: UserId) -> RepoResult<()>;
    /// Returns whether a membership row was inserted.
    fn add_team_member(&self, id: TeamId, user_id: UserId) -> RepoResult<bool>;
    /// Returns whether a membership row was removed.
    fn remove_team_member(&self, id: TeamId, user_id: UserId) -> RepoResult<bool>;
    /// Team currently led by `user_id`, if any.
    fn team_led_by(&self, user_id: UserId) -> RepoResult<Option<TeamId>>;
}

impl TeamRepository for SqliteStore<'_> {
    fn create_team(&self, team: &Team) -> RepoResult<TeamId> {
        team.validate()?;

        let tx = self.immediate_tx()?;

        let mut errors = ValidationErrors::new();
        if let Some(leader_id) = team.leader_id {
            if !is_active_participant_on(&tx, team.project_id, leader_id)? {
                errors.add("leader_id", NOT_A_PARTICIPANT);
            }
        }
        for member_id in &team.member_ids {
            if !is_active_participant_on(&tx, team.project_id, *member_id)? {
                errors.add("member_ids", format!("{member_id}: {NOT_A_PARTICIPANT}"));
            }
        }
        errors.into_result()?;

        tx.execute(
            "INSERT INTO teams (
                id,
                name,
                description,
                project_id,
                leader_id,
                created_on
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                team.id.to_string(),
                team.name.trim(),
                team.description.as_deref(),
                team.project_id.to_string(),
                team.leader_id.map(|id| id.to_string()),
                team.created_on,
            ],
        )
        .map_err(|err| map_unique_violation(err, TEAM_UNIQUE_RULES))?;

        for member_id in &team.member_ids {
            insert_member(&tx, team.id, *member_id)?;
        }
        tx.commit()?;

        Ok(team.id)
    }

    fn update_team(&self, team: &Team) -> RepoResult<()> {
        team.validate()?;

        let changed = self
            .conn()
            .execute(
                "UPDATE teams
                 SET name = ?2,
                     description = ?3
                 WHERE id = ?1;",
                params![
                    team.id.to_string(),
                    team.name.trim(),
                    team.description.as_deref(),
                ],
            )
            .map_err(|err| map_unique_violation(err, TEAM_UNIQUE_RULES))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "team",
                id: team.id,
            });
        }
        Ok(())
    }

    fn get_team(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{TEAM_SELECT_SQL} WHERE t.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut team = parse_team_row(row)?;
            team.member_ids = list_member_ids(self.conn(), team.id)?;
            return Ok(Some(team));
        }
        Ok(None)
    }

    fn list_teams(&self, query: &TeamListQuery) -> RepoResult<Vec<Team>> {
        let mut sql = format!("{TEAM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(project_id) = query.project_id {
            sql.push_str(" AND t.project_id = ?");
            bind_values.push(Value::Text(project_id.to_string()));
        }

        if let Some(user_id) = query.visible_to {
            sql.push_str(
                " AND (p.creator_id = ? OR EXISTS(
                    SELECT 1
                    FROM participations pa
                    WHERE pa.project_id = t.project_id
                      AND pa.user_id = ?
                      AND pa.is_active = 1
                ))",
            );
            bind_values.push(Value::Text(user_id.to_string()));
            bind_values.push(Value::Text(user_id.to_string()));
        }

        sql.push_str(" ORDER BY p.name ASC, t.name ASC, t.id ASC");

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut teams = Vec::new();
        while let Some(row) = rows.next()? {
            teams.push(parse_team_row(row)?);
        }
        drop(rows);

        for team in &mut teams {
            team.member_ids = list_member_ids(self.conn(), team.id)?;
        }
        Ok(teams)
    }

    fn delete_team(&self, id: TeamId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM teams WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "team", id });
        }
        Ok(())
    }

    fn set_team_leader(&self, id: TeamId, leader_id: UserId) -> RepoResult<()> {
        let tx = self.immediate_tx()?;
        ensure_team_exists(&tx, id)?;

        let changed = tx
            .execute(
                "UPDATE teams
                 SET leader_id = ?2
                 WHERE id = ?1
                   AND EXISTS(
                       SELECT 1
                       FROM participations pa
                       WHERE pa.project_id = teams.project_id
                         AND pa.user_id = ?2
                         AND pa.is_active = 1
                   );",
                params![id.to_string(), leader_id.to_string()],
            )
            .map_err(|err| map_unique_violation(err, TEAM_UNIQUE_RULES))?;
        if changed == 0 {
            return Err(ValidationErrors::single("user_id", NOT_A_PARTICIPANT).into());
        }

        insert_member(&tx, id, leader_id)?;
        tx.commit()?;
        Ok(())
    }

    fn add_team_member(&self, id: TeamId, user_id: UserId) -> RepoResult<bool> {
        let tx = self.immediate_tx()?;
        let project_id = team_project(&tx, id)?;
        if !is_active_participant_on(&tx, project_id, user_id)? {
            return Err(ValidationErrors::single("user_id", NOT_A_PARTICIPANT).into());
        }
        let inserted = insert_member(&tx, id, user_id)?;
        tx.commit()?;
        Ok(inserted)
    }

    fn remove_team_member(&self, id: TeamId, user_id: UserId) -> RepoResult<bool> {
        ensure_team_exists(self.conn(), id)?;
        let removed = self.conn().execute(
            "DELETE FROM team_members
             WHERE team_id = ?1
               AND user_id = ?2;",
            params![id.to_string(), user_id.to_string()],
        )?;
        Ok(removed == 1)
    }

    fn team_led_by(&self, user_id: UserId) -> RepoResult<Option<TeamId>> {
        let value: Option<String> = self
            .conn()
            .query_row(
                "SELECT id FROM teams WHERE leader_id = ?1;",
                [user_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        value
            .map(|text| parse_uuid(&text, "teams.id"))
            .transpose()
    }
}

fn insert_member(conn: &Connection, team_id: TeamId, user_id: UserId) -> RepoResult<bool> {
    let inserted = conn.execute(
        "INSERT INTO team_members (team_id, user_id)
         VALUES (?1, ?2)
         ON CONFLICT(team_id, user_id) DO NOTHING;",
        params![team_id.to_string(), user_id.to_string()],
    )?;
    Ok(inserted == 1)
}

fn ensure_team_exists(conn: &Connection, id: TeamId) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM teams WHERE id = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::NotFound { entity: "team", id });
    }
    Ok(())
}

fn team_project(conn: &Connection, id: TeamId) -> RepoResult<ProjectId> {
    let value: Option<String> = conn
        .query_row(
            "SELECT project_id FROM teams WHERE id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match value {
        Some(text) => parse_uuid(&text, "teams.project_id"),
        None => Err(RepoError::NotFound { entity: "team", id }),
    }
}

fn list_member_ids(conn: &Connection, team_id: TeamId) -> RepoResult<Vec<UserId>> {
    let mut stmt = conn.prepare(
        "SELECT user_id
         FROM team_members
         WHERE team_id = ?1
         ORDER BY user_id ASC;",
    )?;
    let mut rows = stmt.query([team_id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "team_members.user_id")?);
    }
    Ok(ids)
}

fn parse_team_row(row: &Row<'_>) -> RepoResult<Team> {
    let id_text: String = row.get("id")?;
    let project_text: String = row.get("project_id")?;

    let team = Team {
        id: parse_uuid(&id_text, "teams.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        project_id: parse_uuid(&project_text, "teams.project_id")?,
        leader_id: parse_optional_uuid(row.get("leader_id")?, "teams.leader_id")?,
        member_ids: Vec::new(),
        created_on: row.get("created_on")?,
    };
    team.validate()?;
    Ok(team)
}
