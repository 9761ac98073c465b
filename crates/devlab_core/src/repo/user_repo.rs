//! User directory repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `username` and `email` collisions surface as one `RepoError::Conflict`
//!   naming every taken field.
//! - Deleting a user who still created projects is rejected; other
//!   references are nulled (`responsible`, team `leader`, project `advisor`)
//!   or cascaded (participations, team memberships) by the schema.

use crate::model::user::{User, UserId, UserRole};
use crate::model::validation::ValidationErrors;
use crate::repo::{
    bool_to_int, map_unique_violation, parse_bool, parse_uuid, RepoError, RepoResult,
    SqliteStore, UniqueRule,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    name,
    password_hash,
    role,
    is_staff
FROM users";

const USERNAME_TAKEN: &str = "a user with that username already exists";
const EMAIL_TAKEN: &str = "a user with that email already exists";

const USER_UNIQUE_RULES: &[UniqueRule] = &[
    UniqueRule {
        columns: "users.username",
        field: "username",
        message: USERNAME_TAKEN,
    },
    UniqueRule {
        columns: "users.email",
        field: "email",
        message: EMAIL_TAKEN,
    },
];

/// Repository interface for the user directory.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Lists users ordered by username, optionally filtered by role.
    fn list_users(&self, role: Option<UserRole>) -> RepoResult<Vec<User>>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

impl UserRepository for SqliteStore<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        let tx = self.immediate_tx()?;
        ensure_identity_free(&tx, user)?;
        tx.execute(
            "INSERT INTO users (
                id,
                username,
                email,
                name,
                password_hash,
                role,
                is_staff
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                user.id.to_string(),
                user.username.as_str(),
                user.email.trim(),
                user.name.trim(),
                user.password_hash.as_str(),
                user.role.as_str(),
                bool_to_int(user.is_staff),
            ],
        )
        .map_err(|err| map_unique_violation(err, USER_UNIQUE_RULES))?;
        tx.commit()?;

        Ok(user.id)
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let tx = self.immediate_tx()?;
        ensure_identity_free(&tx, user)?;
        let changed = tx
            .execute(
                "UPDATE users
                 SET
                    email = ?2,
                    name = ?3,
                    password_hash = ?4,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![
                    user.id.to_string(),
                    user.email.trim(),
                    user.name.trim(),
                    user.password_hash.as_str(),
                ],
            )
            .map_err(|err| map_unique_violation(err, USER_UNIQUE_RULES))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: user.id,
            });
        }
        tx.commit()?;
        Ok(())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn list_users(&self, role: Option<UserRole>) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn().prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE (?1 IS NULL OR role = ?1)
             ORDER BY username ASC;"
        ))?;
        let mut rows = stmt.query([role.map(UserRole::as_str)])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let tx = self.immediate_tx()?;

        let owned_project: Option<String> = tx
            .query_row(
                "SELECT id FROM projects WHERE creator_id = ?1 LIMIT 1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if owned_project.is_some() {
            return Err(RepoError::Conflict(ValidationErrors::single(
                "user_id",
                "user still owns projects; delete or reassign them first",
            )));
        }

        let changed = tx.execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }

        tx.commit()?;
        Ok(())
    }
}

/// Rejects `user` when another account holds its username or email,
/// naming every taken field at once.
fn ensure_identity_free(conn: &Connection, user: &User) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "SELECT username = ?2, email = ?3
         FROM users
         WHERE id <> ?1
           AND (username = ?2 OR email = ?3);",
    )?;
    let mut rows = stmt.query(params![
        user.id.to_string(),
        user.username.as_str(),
        user.email.trim(),
    ])?;

    let mut username_taken = false;
    let mut email_taken = false;
    while let Some(row) = rows.next()? {
        username_taken |= row.get::<_, bool>(0)?;
        email_taken |= row.get::<_, bool>(1)?;
    }

    let mut errors = ValidationErrors::new();
    if username_taken {
        errors.add("username", USERNAME_TAKEN);
    }
    if email_taken {
        errors.add("email", EMAIL_TAKEN);
    }
    errors.into_result().map_err(RepoError::Conflict)
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    let role_text: String = row.get("role")?;
    let role = UserRole::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid user role `{role_text}` in users.role"))
    })?;

    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        name: row.get("name")?,
        password_hash: row.get("password_hash")?,
        role,
        is_staff: parse_bool(row.get("is_staff")?, "users.is_staff")?,
    })
}
