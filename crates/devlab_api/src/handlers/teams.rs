//! `/teams` endpoints. Every call requires an authenticated caller.

use super::{authenticate, parse_body, run};
use crate::dto::{CreateTeamRequest, TeamListParams, UpdateTeamRequest, UserRefRequest};
use crate::response::ApiResponse;
use crate::views::{load_all, TeamView};
use devlab_core::{TeamId, TeamService, UserId};
use rusqlite::Connection;

/// `POST /teams` → 201 / 400 / 403 / 409.
pub fn create_team(conn: &Connection, actor_id: Option<UserId>, body: &str) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: CreateTeamRequest = parse_body(body)?;
        let team = TeamService::new(store).create(&actor, request.into())?;
        Ok(ApiResponse::created(&TeamView::load(&store, team)?))
    })
}

/// `GET /teams?project_id=..`, limited to teams the caller may view.
pub fn list_teams(
    conn: &Connection,
    actor_id: Option<UserId>,
    params: TeamListParams,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let teams = TeamService::new(store).list(&actor, params.project_id)?;
        let views = load_all(teams, |team| TeamView::load(&store, team))?;
        Ok(ApiResponse::ok(&views))
    })
}

/// `GET /teams/{id}`
pub fn get_team(conn: &Connection, actor_id: Option<UserId>, id: TeamId) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let team = TeamService::new(store).get(&actor, id)?;
        Ok(ApiResponse::ok(&TeamView::load(&store, team)?))
    })
}

/// `PATCH /teams/{id}`
pub fn update_team(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: TeamId,
    body: &str,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: UpdateTeamRequest = parse_body(body)?;
        let team = TeamService::new(store).update(&actor, id, request.into())?;
        Ok(ApiResponse::ok(&TeamView::load(&store, team)?))
    })
}

/// `DELETE /teams/{id}` → 204.
pub fn delete_team(conn: &Connection, actor_id: Option<UserId>, id: TeamId) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        TeamService::new(store).delete(&actor, id)?;
        Ok(ApiResponse::no_content())
    })
}

/// `POST /teams/{id}/leader` body `{user_id}`
pub fn set_team_leader(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: TeamId,
    body: &str,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: UserRefRequest = parse_body(body)?;
        let team = TeamService::new(store).set_leader(&actor, id, request.user_id)?;
        Ok(ApiResponse::ok(&TeamView::load(&store, team)?))
    })
}

/// `POST /teams/{id}/members` body `{user_id}`
pub fn add_team_member(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: TeamId,
    body: &str,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: UserRefRequest = parse_body(body)?;
        let team = TeamService::new(store).add_member(&actor, id, request.user_id)?;
        Ok(ApiResponse::ok(&TeamView::load(&store, team)?))
    })
}

/// `DELETE /teams/{id}/members/{user_id}`
pub fn remove_team_member(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: TeamId,
    user_id: UserId,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let team = TeamService::new(store).remove_member(&actor, id, user_id)?;
        Ok(ApiResponse::ok(&TeamView::load(&store, team)?))
    })
}
