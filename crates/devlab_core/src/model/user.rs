//! User directory model.
//!
//! # Invariants
//! - `username` and `email` are unique across the directory (storage-backed).
//! - `role` is fixed for the lifetime of a session; profile fields are not.
//! - `password_hash` is never serialized.

use crate::model::validation::{check_required_text, ValidationErrors};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

const USERNAME_MAX_CHARS: usize = 150;
const NAME_MAX_CHARS: usize = 100;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9@.+_-]+$").expect("valid username regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Role tag driving every authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Creates and manages projects, assigns leaders and advisors.
    Coordinator,
    /// Can advise projects.
    Professor,
    /// Can participate in projects, lead teams and own tasks.
    Student,
    /// Read-only account.
    Visitor,
}

impl UserRole {
    /// Stable storage and wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coordinator => "coordinator",
            Self::Professor => "professor",
            Self::Student => "student",
            Self::Visitor => "visitor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "coordinator" => Some(Self::Coordinator),
            "professor" => Some(Self::Professor),
            "student" => Some(Self::Student),
            "visitor" => Some(Self::Visitor),
            _ => None,
        }
    }
}

/// Account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub is_staff: bool,
}

impl User {
    /// Creates a non-staff user with a generated id and empty password hash.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            name: name.into(),
            password_hash: String::new(),
            role,
            is_staff: false,
        }
    }

    pub fn is_role(&self, role: UserRole) -> bool {
        self.role == role
    }

    /// Checks record-local rules. Uniqueness is checked by storage.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_required_text("username", &self.username, USERNAME_MAX_CHARS, &mut errors);
        if !errors.contains("username") && !USERNAME_RE.is_match(&self.username) {
            errors.add(
                "username",
                "username may contain only letters, digits and @/./+/-/_",
            );
        }

        if !EMAIL_RE.is_match(self.email.trim()) {
            errors.add("email", "enter a valid email address");
        }

        check_required_text("name", &self.name, NAME_MAX_CHARS, &mut errors);
        errors.into_result()
    }

    /// Compact projection used inside project/team/task representations.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Compact user projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::{User, UserRole};

    #[test]
    fn role_round_trips_through_storage_value() {
        for role in [
            UserRole::Coordinator,
            UserRole::Professor,
            UserRole::Student,
            UserRole::Visitor,
        ] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("estudante"), None);
    }

    #[test]
    fn validate_rejects_bad_username_and_email() {
        let user = User::new("ana maria", "not-an-email", "Ana", UserRole::Student);
        let errors = user.validate().unwrap_err();
        assert!(errors.contains("username"));
        assert!(errors.contains("email"));
        assert!(!errors.contains("name"));
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let mut user = User::new("ana", "ana@example.com", "Ana", UserRole::Student);
        user.password_hash = "pbkdf2$secret".to_string();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"role\":\"student\""));
    }
}
