//! `/users` endpoints.

use super::{authenticate, parse_body, run};
use crate::dto::{RegisterUserRequest, UpdateProfileRequest};
use crate::response::ApiResponse;
use devlab_core::{UserId, UserRole, UserService};
use rusqlite::Connection;

/// `POST /users` → 201 / 400 / 409.
pub fn register_user(conn: &Connection, body: &str) -> ApiResponse {
    run(conn, |store| {
        let request: RegisterUserRequest = parse_body(body)?;
        let user = UserService::new(store).register(request.into())?;
        Ok(ApiResponse::created(&user))
    })
}

/// `GET /users/me` → 200 / 401.
pub fn current_user(conn: &Connection, actor_id: Option<UserId>) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        Ok(ApiResponse::ok(&actor))
    })
}

/// `GET /users?role=..`
pub fn list_users(
    conn: &Connection,
    actor_id: Option<UserId>,
    role: Option<UserRole>,
) -> ApiResponse {
    run(conn, |store| {
        authenticate(&store, actor_id)?;
        let users = UserService::new(store).list(role)?;
        Ok(ApiResponse::ok(&users))
    })
}

/// `GET /users/{id}`
pub fn get_user(conn: &Connection, actor_id: Option<UserId>, id: UserId) -> ApiResponse {
    run(conn, |store| {
        authenticate(&store, actor_id)?;
        let user = UserService::new(store).get(id)?;
        Ok(ApiResponse::ok(&user))
    })
}

/// `PATCH /users/{id}` → 200 / 403.
pub fn update_user(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: UserId,
    body: &str,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: UpdateProfileRequest = parse_body(body)?;
        let user = UserService::new(store).update_profile(&actor, id, request.into())?;
        Ok(ApiResponse::ok(&user))
    })
}

/// `DELETE /users/{id}` → 204, staff only.
pub fn delete_user(conn: &Connection, actor_id: Option<UserId>, id: UserId) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        UserService::new(store).delete(&actor, id)?;
        Ok(ApiResponse::no_content())
    })
}
