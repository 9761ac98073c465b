//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts, one trait per aggregate.
//! - Isolate SQLite query details from service/business orchestration.
//! - Translate storage uniqueness violations into semantic conflicts.
//!
//! # Invariants
//! - General write paths (`create_*`/`update_*`) call the record's
//!   `validate()` before SQL mutations. Narrow single-column writers
//!   (`set_*`) do not.
//! - Multi-row writes run inside one `IMMEDIATE` transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::validation::ValidationErrors;
use participation_repo::ParticipationRepository;
use project_repo::ProjectRepository;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use task_repo::TaskRepository;
use team_repo::TeamRepository;
use user_repo::UserRepository;
use uuid::Uuid;

pub mod participation_repo;
pub mod project_repo;
pub mod task_repo;
pub mod team_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every aggregate.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed its own `validate()` check.
    Validation(ValidationErrors),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target record does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Write would break uniqueness rules, keyed by the fields they protect.
    Conflict(ValidationErrors),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict(errors) => write!(f, "conflict: {errors}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) | Self::Conflict(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for RepoError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

const REQUIRED_TABLES: &[&str] = &[
    "users",
    "projects",
    "participations",
    "teams",
    "team_members",
    "tasks",
];

/// Every repository contract at once, for services spanning all aggregates.
pub trait Store:
    UserRepository + ProjectRepository + ParticipationRepository + TeamRepository + TaskRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + ProjectRepository
        + ParticipationRepository
        + TeamRepository
        + TaskRepository
{
}

/// SQLite-backed store implementing every repository trait.
///
/// All repositories share one connection so that service operations see a
/// single consistent database.
#[derive(Clone, Copy)]
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    /// Creates a store from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` when the schema is incomplete.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &'conn Connection {
        self.conn
    }

    /// Starts a write transaction that takes the database write lock up front.
    pub(crate) fn immediate_tx(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in REQUIRED_TABLES {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

/// Maps one storage uniqueness rule to the input field it protects.
pub(crate) struct UniqueRule {
    /// Column list as reported by SQLite, e.g. `teams.project_id, teams.name`.
    pub columns: &'static str,
    pub field: &'static str,
    pub message: &'static str,
}

/// Converts a UNIQUE violation matching one of `rules` into `Conflict`.
///
/// Any other error is passed through as `Db`.
pub(crate) fn map_unique_violation(err: rusqlite::Error, rules: &[UniqueRule]) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        let is_unique = failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY;
        let columns = message.strip_prefix("UNIQUE constraint failed: ");
        if is_unique {
            if let Some(rule) = rules.iter().find(|rule| columns == Some(rule.columns)) {
                return RepoError::Conflict(ValidationErrors::single(rule.field, rule.message));
            }
        }
    }
    err.into()
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    column: &'static str,
) -> RepoResult<Option<Uuid>> {
    value.map(|value| parse_uuid(&value, column)).transpose()
}

pub(crate) fn parse_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

/// Case-insensitive substring pattern for `LIKE ... ESCAPE '\'`.
///
/// Blank terms yield `None` so callers skip the filter entirely.
pub(crate) fn contains_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    Some(pattern)
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("  robo "), Some("%robo%".to_string()));
        assert_eq!(contains_pattern("50%_off"), Some("%50\\%\\_off%".to_string()));
        assert_eq!(contains_pattern("   "), None);
    }
}
