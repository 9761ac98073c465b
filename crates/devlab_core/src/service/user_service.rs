//! User directory use-case service.
//!
//! # Responsibility
//! - Register accounts and edit profiles under the self-or-staff rule.
//!
//! # Invariants
//! - `role` and `is_staff` are never changed by profile edits.
//! - Only staff may delete accounts.

use crate::model::user::{User, UserId, UserRole};
use crate::policy::can_edit_profile;
use crate::repo::user_repo::UserRepository;
use crate::service::{require_user, ServiceError, ServiceResult};
use log::info;

/// Registration payload.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_staff: bool,
}

impl NewUser {
    /// Non-staff registration payload with an empty password hash.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            name: name.into(),
            password_hash: String::new(),
            role,
            is_staff: false,
        }
    }
}

/// Editable profile fields; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// User directory service facade.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers one account.
    ///
    /// # Errors
    /// - `Validation` for malformed username/email/name.
    /// - `Conflict` when username or email is taken.
    pub fn register(&self, data: NewUser) -> ServiceResult<User> {
        let mut user = User::new(data.username.trim(), data.email, data.name, data.role);
        user.password_hash = data.password_hash;
        user.is_staff = data.is_staff;

        self.repo.create_user(&user)?;
        info!(
            "event=user_register module=service status=ok user_id={} role={}",
            user.id,
            user.role.as_str()
        );
        self.get(user.id)
    }

    pub fn get(&self, id: UserId) -> ServiceResult<User> {
        require_user(&self.repo, id)
    }

    pub fn list(&self, role: Option<UserRole>) -> ServiceResult<Vec<User>> {
        Ok(self.repo.list_users(role)?)
    }

    /// Applies profile edits after the self-or-staff check.
    pub fn update_profile(
        &self,
        actor: &User,
        id: UserId,
        changes: ProfileChanges,
    ) -> ServiceResult<User> {
        let mut user = require_user(&self.repo, id)?;
        if !can_edit_profile(actor, &user) {
            return Err(ServiceError::forbidden(
                "you can only edit your own profile",
            ));
        }

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }

        self.repo.update_user(&user)?;
        info!(
            "event=user_update module=service status=ok user_id={} actor_id={}",
            user.id, actor.id
        );
        self.get(id)
    }

    /// Deletes one account. Staff only.
    ///
    /// # Errors
    /// - `Conflict` while the user still created a project.
    pub fn delete(&self, actor: &User, id: UserId) -> ServiceResult<()> {
        if !actor.is_staff {
            return Err(ServiceError::forbidden("only staff can delete users"));
        }
        self.repo.delete_user(id)?;
        info!(
            "event=user_delete module=service status=ok user_id={} actor_id={}",
            id, actor.id
        );
        Ok(())
    }
}
