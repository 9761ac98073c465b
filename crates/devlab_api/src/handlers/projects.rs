//! `/projects` endpoints, including participants, leader and advisor.

use super::{authenticate, optional_actor, parse_body, run};
use crate::dto::{
    AdvisorRequest, CreateProjectRequest, ProjectListParams, UpdateProjectRequest, UserRefRequest,
};
use crate::response::ApiResponse;
use crate::views::{load_all, ParticipationView, ProjectView};
use devlab_core::{ParticipationService, ProjectId, ProjectService, UserId};
use rusqlite::Connection;

/// `POST /projects` → 201 with the representation, 400 on validation.
pub fn create_project(conn: &Connection, actor_id: Option<UserId>, body: &str) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: CreateProjectRequest = parse_body(body)?;
        let project = ProjectService::new(store).create(&actor, request.into())?;
        Ok(ApiResponse::created(&ProjectView::load(&store, project)?))
    })
}

/// `GET /projects`; anonymous callers only see public projects.
pub fn list_projects(
    conn: &Connection,
    actor_id: Option<UserId>,
    params: ProjectListParams,
) -> ApiResponse {
    run(conn, |store| {
        let actor = optional_actor(&store, actor_id)?;
        let projects = ProjectService::new(store).list(actor.as_ref(), params.into())?;
        let views = load_all(projects, |project| ProjectView::load(&store, project))?;
        Ok(ApiResponse::ok(&views))
    })
}

/// `GET /projects/public`
pub fn list_public_projects(conn: &Connection) -> ApiResponse {
    run(conn, |store| {
        let projects = ProjectService::new(store).list_public()?;
        let views = load_all(projects, |project| ProjectView::load(&store, project))?;
        Ok(ApiResponse::ok(&views))
    })
}

/// `GET /projects/{id}`
pub fn get_project(conn: &Connection, actor_id: Option<UserId>, id: ProjectId) -> ApiResponse {
    run(conn, |store| {
        let actor = optional_actor(&store, actor_id)?;
        let project = ProjectService::new(store).get(actor.as_ref(), id)?;
        Ok(ApiResponse::ok(&ProjectView::load(&store, project)?))
    })
}

/// `PATCH/PUT /projects/{id}` → 403 unless the caller created the project.
pub fn update_project(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: ProjectId,
    body: &str,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: UpdateProjectRequest = parse_body(body)?;
        let project = ProjectService::new(store).update(&actor, id, request.into())?;
        Ok(ApiResponse::ok(&ProjectView::load(&store, project)?))
    })
}

/// `DELETE /projects/{id}` → 204.
pub fn delete_project(conn: &Connection, actor_id: Option<UserId>, id: ProjectId) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        ProjectService::new(store).delete(&actor, id)?;
        Ok(ApiResponse::no_content())
    })
}

/// `POST /projects/{id}/participants` body `{user_id}` → 201.
pub fn add_participant(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: ProjectId,
    body: &str,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: UserRefRequest = parse_body(body)?;
        let participation =
            ParticipationService::new(store).add_participant(&actor, id, request.user_id)?;
        Ok(ApiResponse::created(&ParticipationView::load(
            &store,
            participation,
        )?))
    })
}

/// `DELETE /projects/{id}/participants/{user_id}` → 200 with the closed
/// participation.
pub fn remove_participant(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: ProjectId,
    user_id: UserId,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let participation =
            ParticipationService::new(store).remove_participant(&actor, id, user_id)?;
        Ok(ApiResponse::ok(&ParticipationView::load(
            &store,
            participation,
        )?))
    })
}

/// `GET /projects/{id}/participants`
pub fn list_participants(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: ProjectId,
    include_inactive: bool,
) -> ApiResponse {
    run(conn, |store| {
        let actor = optional_actor(&store, actor_id)?;
        let participations = ParticipationService::new(store).list_participants(
            actor.as_ref(),
            id,
            include_inactive,
        )?;
        let views = load_all(participations, |participation| {
            ParticipationView::load(&store, participation)
        })?;
        Ok(ApiResponse::ok(&views))
    })
}

/// `POST /projects/{id}/leader` body `{user_id}` → 200 with the leader.
pub fn set_project_leader(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: ProjectId,
    body: &str,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: UserRefRequest = parse_body(body)?;
        let leader = ParticipationService::new(store).set_leader(&actor, id, request.user_id)?;
        Ok(ApiResponse::ok(&ParticipationView::load(&store, leader)?))
    })
}

/// `POST /projects/{id}/advisor` body `{professor_id}` → 200.
pub fn set_project_advisor(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: ProjectId,
    body: &str,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: AdvisorRequest = parse_body(body)?;
        let project = ProjectService::new(store).set_advisor(&actor, id, request.professor_id)?;
        Ok(ApiResponse::ok(&ProjectView::load(&store, project)?))
    })
}

/// `GET /projects/{id}/dashboard`
pub fn project_dashboard(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: ProjectId,
) -> ApiResponse {
    run(conn, |store| {
        let actor = optional_actor(&store, actor_id)?;
        let dashboard = ProjectService::new(store).dashboard(actor.as_ref(), id)?;
        Ok(ApiResponse::ok(&dashboard))
    })
}
