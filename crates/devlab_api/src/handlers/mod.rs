//! One function per endpoint.
//!
//! # Contract
//! - Inputs: a migrated connection, the caller id resolved by the host
//!   (`None` for anonymous), path ids, and the raw JSON body.
//! - Output: always an `ApiResponse`; no handler panics or returns `Err`.

use crate::response::ApiResponse;
use devlab_core::{ServiceError, ServiceResult, SqliteStore, User, UserId, UserRepository};
use rusqlite::Connection;
use serde::de::DeserializeOwned;

pub mod projects;
pub mod tasks;
pub mod teams;
pub mod users;

pub use projects::*;
pub use tasks::*;
pub use teams::*;
pub use users::*;

/// Handler body result; both arms are complete responses.
pub(crate) type Reply = Result<ApiResponse, ApiResponse>;

/// Opens a store over `conn` and runs one handler body.
pub(crate) fn run<'conn>(
    conn: &'conn Connection,
    body: impl FnOnce(SqliteStore<'conn>) -> Reply,
) -> ApiResponse {
    let store = match SqliteStore::try_new(conn) {
        Ok(store) => store,
        Err(err) => return ApiResponse::from(err),
    };
    match body(store) {
        Ok(response) | Err(response) => response,
    }
}

/// Decodes a JSON request body. A blank body decodes as `{}`.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiResponse> {
    let raw = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(raw).map_err(|err| {
        log::info!(
            "event=request_decode module=api status=error error={}",
            err
        );
        ApiResponse::detail(400, format!("malformed request body: {err}"))
    })
}

/// Resolves the caller into a stored user.
///
/// Anonymous callers and ids without an account are unauthenticated.
pub(crate) fn authenticate(
    store: &impl UserRepository,
    actor_id: Option<UserId>,
) -> ServiceResult<User> {
    match actor_id {
        Some(id) => store.get_user(id)?.ok_or(ServiceError::Unauthenticated),
        None => Err(ServiceError::Unauthenticated),
    }
}

/// Like `authenticate`, but anonymous callers resolve to `None`.
pub(crate) fn optional_actor(
    store: &impl UserRepository,
    actor_id: Option<UserId>,
) -> ServiceResult<Option<User>> {
    match actor_id {
        Some(_) => authenticate(store, actor_id).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_body;
    use crate::dto::UserRefRequest;
    use serde_json::json;

    #[test]
    fn malformed_body_is_a_detail_error() {
        let response = parse_body::<UserRefRequest>("{not json").unwrap_err();
        assert_eq!(response.status, 400);
        assert!(response.body["detail"][0]
            .as_str()
            .unwrap()
            .starts_with("malformed request body"));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let response = parse_body::<UserRefRequest>("").unwrap_err();
        assert_eq!(response.status, 400);
        assert!(response.body.get("detail").is_some());
        assert_ne!(response.body, json!({}));
    }
}
