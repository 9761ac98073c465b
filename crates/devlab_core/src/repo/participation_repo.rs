//! Participation ledger repository contracts and SQLite implementation.
//!
//! # Invariants
//! - One row per `(user_id, project_id)`; leaving a project deactivates the
//!   row instead of deleting it.
//! - Leader hand-over (clear old leader, set new leader) is one `IMMEDIATE`
//!   transaction; the partial unique index on `is_leader` rejects any write
//!   that would leave two leaders.
//! - Withdrawing a participant also drops their team memberships and team
//!   leadership inside the same project.

use crate::model::participation::Participation;
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::repo::{
    map_unique_violation, parse_bool, parse_uuid, RepoError, RepoResult, SqliteStore, UniqueRule,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const PARTICIPATION_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    project_id,
    entry_date,
    exit_date,
    is_active,
    is_leader
FROM participations";

const PARTICIPATION_UNIQUE_RULES: &[UniqueRule] = &[
    UniqueRule {
        columns: "participations.user_id, participations.project_id",
        field: "user_id",
        message: "user already participates in this project",
    },
    UniqueRule {
        columns: "participations.project_id",
        field: "user_id",
        message: "project already has a leader",
    },
];

/// Result of enrolling a user in a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// A new participation row was inserted.
    Created(Participation),
    /// A previously inactive participation was reactivated.
    Reactivated(Participation),
    /// An active participation already existed; nothing changed.
    AlreadyActive(Participation),
}

/// Repository interface for the participation ledger.
pub trait ParticipationRepository {
    fn get_participation(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> RepoResult<Option<Participation>>;
    /// Lists participations newest entry first.
    fn list_participations(
        &self,
        project_id: ProjectId,
        include_inactive: bool,
    ) -> RepoResult<Vec<Participation>>;
    fn is_active_participant(&self, project_id: ProjectId, user_id: UserId) -> RepoResult<bool>;
    /// Inserts or reactivates the pair's participation.
    fn enroll_participant(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        entry_date: NaiveDate,
    ) -> RepoResult<EnrollOutcome>;
    /// Inserts an active participation unless the pair already has a row.
    ///
    /// Returns whether a row was inserted.
    fn ensure_participation(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        entry_date: NaiveDate,
    ) -> RepoResult<bool>;
    /// Atomically moves the project's leader flag to `user_id`.
    fn set_project_leader(&self, project_id: ProjectId, user_id: UserId) -> RepoResult<()>;
    fn project_leader(&self, project_id: ProjectId) -> RepoResult<Option<Participation>>;
    /// Deactivates the pair's participation and drops its team roles.
    fn withdraw_participant(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        exit_date: NaiveDate,
    ) -> RepoResult<Participation>;
}

impl ParticipationRepository for SqliteStore<'_> {
    fn get_participation(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> RepoResult<Option<Participation>> {
        load_participation(self.conn(), project_id, user_id)
    }

    fn list_participations(
        &self,
        project_id: ProjectId,
        include_inactive: bool,
    ) -> RepoResult<Vec<Participation>> {
        let mut stmt = self.conn().prepare(&format!(
            "{PARTICIPATION_SELECT_SQL}
             WHERE project_id = ?1
               AND (?2 = 1 OR is_active = 1)
             ORDER BY entry_date DESC, user_id ASC;"
        ))?;
        let mut rows = stmt.query(params![project_id.to_string(), include_inactive])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_participation_row(row)?);
        }
        Ok(items)
    }

    fn is_active_participant(&self, project_id: ProjectId, user_id: UserId) -> RepoResult<bool> {
        is_active_participant_on(self.conn(), project_id, user_id)
    }

    fn enroll_participant(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        entry_date: NaiveDate,
    ) -> RepoResult<EnrollOutcome> {
        let tx = self.immediate_tx()?;

        let outcome = match load_participation(&tx, project_id, user_id)? {
            Some(existing) if existing.is_active => EnrollOutcome::AlreadyActive(existing),
            Some(existing) => {
                tx.execute(
                    "UPDATE participations
                     SET is_active = 1,
                         is_leader = 0,
                         entry_date = ?2,
                         exit_date = NULL
                     WHERE id = ?1;",
                    params![existing.id.to_string(), entry_date],
                )?;
                EnrollOutcome::Reactivated(required_participation(&tx, project_id, user_id)?)
            }
            None => {
                let participation = Participation::new(user_id, project_id, entry_date);
                insert_participation(&tx, &participation)?;
                EnrollOutcome::Created(participation)
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn ensure_participation(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        entry_date: NaiveDate,
    ) -> RepoResult<bool> {
        let participation = Participation::new(user_id, project_id, entry_date);
        let inserted = self.conn().execute(
            "INSERT INTO participations (
                id,
                user_id,
                project_id,
                entry_date,
                exit_date,
                is_active,
                is_leader
            ) VALUES (?1, ?2, ?3, ?4, NULL, 1, 0)
            ON CONFLICT(user_id, project_id) DO NOTHING;",
            params![
                participation.id.to_string(),
                user_id.to_string(),
                project_id.to_string(),
                entry_date,
            ],
        )?;
        Ok(inserted == 1)
    }

    fn set_project_leader(&self, project_id: ProjectId, user_id: UserId) -> RepoResult<()> {
        let tx = self.immediate_tx()?;

        tx.execute(
            "UPDATE participations
             SET is_leader = 0
             WHERE project_id = ?1
               AND is_leader = 1
               AND user_id <> ?2;",
            params![project_id.to_string(), user_id.to_string()],
        )?;

        let changed = tx
            .execute(
                "UPDATE participations
                 SET is_leader = 1
                 WHERE project_id = ?1
                   AND user_id = ?2
                   AND is_active = 1;",
                params![project_id.to_string(), user_id.to_string()],
            )
            .map_err(|err| map_unique_violation(err, PARTICIPATION_UNIQUE_RULES))?;

        if changed == 0 {
            // Dropping `tx` rolls back the cleared flag.
            return Err(RepoError::NotFound {
                entity: "active participation",
                id: user_id,
            });
        }

        tx.commit()?;
        Ok(())
    }

    fn project_leader(&self, project_id: ProjectId) -> RepoResult<Option<Participation>> {
        let mut stmt = self.conn().prepare(&format!(
            "{PARTICIPATION_SELECT_SQL}
             WHERE project_id = ?1
               AND is_leader = 1;"
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_participation_row(row)?));
        }
        Ok(None)
    }

    fn withdraw_participant(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        exit_date: NaiveDate,
    ) -> RepoResult<Participation> {
        let tx = self.immediate_tx()?;

        let changed = tx.execute(
            "UPDATE participations
             SET is_active = 0,
                 is_leader = 0,
                 exit_date = ?3
             WHERE project_id = ?1
               AND user_id = ?2
               AND is_active = 1;",
            params![project_id.to_string(), user_id.to_string(), exit_date],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "active participation",
                id: user_id,
            });
        }

        tx.execute(
            "UPDATE teams
             SET leader_id = NULL
             WHERE project_id = ?1
               AND leader_id = ?2;",
            params![project_id.to_string(), user_id.to_string()],
        )?;
        tx.execute(
            "DELETE FROM team_members
             WHERE user_id = ?2
               AND team_id IN (SELECT id FROM teams WHERE project_id = ?1);",
            params![project_id.to_string(), user_id.to_string()],
        )?;

        let participation = required_participation(&tx, project_id, user_id)?;
        tx.commit()?;
        Ok(participation)
    }
}

/// Active-participant check usable inside an open transaction.
pub(crate) fn is_active_participant_on(
    conn: &Connection,
    project_id: ProjectId,
    user_id: UserId,
) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM participations
            WHERE project_id = ?1
              AND user_id = ?2
              AND is_active = 1
        );",
        params![project_id.to_string(), user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn insert_participation(conn: &Connection, participation: &Participation) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO participations (
            id,
            user_id,
            project_id,
            entry_date,
            exit_date,
            is_active,
            is_leader
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            participation.id.to_string(),
            participation.user_id.to_string(),
            participation.project_id.to_string(),
            participation.entry_date,
            participation.exit_date,
            participation.is_active,
            participation.is_leader,
        ],
    )
    .map_err(|err| map_unique_violation(err, PARTICIPATION_UNIQUE_RULES))?;
    Ok(())
}

fn load_participation(
    conn: &Connection,
    project_id: ProjectId,
    user_id: UserId,
) -> RepoResult<Option<Participation>> {
    let mut stmt = conn.prepare(&format!(
        "{PARTICIPATION_SELECT_SQL}
         WHERE project_id = ?1
           AND user_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![project_id.to_string(), user_id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_participation_row(row)?));
    }
    Ok(None)
}

fn required_participation(
    conn: &Connection,
    project_id: ProjectId,
    user_id: UserId,
) -> RepoResult<Participation> {
    load_participation(conn, project_id, user_id)?.ok_or(RepoError::NotFound {
        entity: "participation",
        id: user_id,
    })
}

fn parse_participation_row(row: &Row<'_>) -> RepoResult<Participation> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    let project_text: String = row.get("project_id")?;
    let is_active = parse_bool(row.get("is_active")?, "participations.is_active")?;
    let is_leader = parse_bool(row.get("is_leader")?, "participations.is_leader")?;

    if is_leader && !is_active {
        return Err(RepoError::InvalidData(format!(
            "inactive participation `{id_text}` is flagged as leader"
        )));
    }

    Ok(Participation {
        id: parse_uuid(&id_text, "participations.id")?,
        user_id: parse_uuid(&user_text, "participations.user_id")?,
        project_id: parse_uuid(&project_text, "participations.project_id")?,
        entry_date: row.get("entry_date")?,
        exit_date: row.get("exit_date")?,
        is_active,
        is_leader,
    })
}
