//! Service error taxonomy shared by every use-case.

use crate::model::validation::ValidationErrors;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by core services.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed or invariant-violating input, keyed by field.
    Validation(ValidationErrors),
    /// Actor lacks authority for the operation.
    Permission(String),
    /// Referenced record does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Uniqueness rules violated, keyed by field.
    Conflict(ValidationErrors),
    /// Operation needs a signed-in actor.
    Unauthenticated,
    /// Storage-level failure.
    Repo(RepoError),
}

impl ServiceError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }

    pub(crate) fn conflict(field: &str, message: impl Into<String>) -> Self {
        Self::Conflict(ValidationErrors::single(field, message))
    }

    pub(crate) fn forbidden(message: impl Into<String>) -> Self {
        Self::Permission(message.into())
    }

    /// Stable machine-readable code used in logs and error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Permission(_) => "permission_denied",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Unauthenticated => "not_authenticated",
            Self::Repo(_) => "storage_error",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "validation failed: {errors}"),
            Self::Permission(message) => write!(f, "permission denied: {message}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict(errors) => write!(f, "conflict: {errors}"),
            Self::Unauthenticated => write!(f, "authentication credentials were not provided"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) | Self::Conflict(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(errors) => Self::Validation(errors),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Conflict(errors) => Self::Conflict(errors),
            other => Self::Repo(other),
        }
    }
}
