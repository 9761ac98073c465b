//! `/tasks` endpoints. Every call requires an authenticated caller.

use super::{authenticate, parse_body, run};
use crate::dto::{
    AssignTaskRequest, ChangeStatusRequest, CreateTaskRequest, TaskListParams, UpdateTaskRequest,
};
use crate::response::ApiResponse;
use crate::views::{load_all, TaskView};
use devlab_core::{TaskId, TaskListQuery, TaskService, UserId};
use rusqlite::Connection;

/// `POST /tasks` → 201 / 400.
pub fn create_task(conn: &Connection, actor_id: Option<UserId>, body: &str) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: CreateTaskRequest = parse_body(body)?;
        let task = TaskService::new(store).create(&actor, request.into())?;
        Ok(ApiResponse::created(&TaskView::load(&store, task)?))
    })
}

/// `GET /tasks` with optional filters, highest priority first.
pub fn list_tasks(
    conn: &Connection,
    actor_id: Option<UserId>,
    params: TaskListParams,
) -> ApiResponse {
    run(conn, |store| {
        authenticate(&store, actor_id)?;
        let query = TaskListQuery::from(params);
        let tasks = TaskService::new(store).list(&query)?;
        let views = load_all(tasks, |task| TaskView::load(&store, task))?;
        Ok(ApiResponse::ok(&views))
    })
}

/// `GET /tasks/{id}`
pub fn get_task(conn: &Connection, actor_id: Option<UserId>, id: TaskId) -> ApiResponse {
    run(conn, |store| {
        authenticate(&store, actor_id)?;
        let task = TaskService::new(store).get(id)?;
        Ok(ApiResponse::ok(&TaskView::load(&store, task)?))
    })
}

/// `PATCH /tasks/{id}`
pub fn update_task(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: TaskId,
    body: &str,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: UpdateTaskRequest = parse_body(body)?;
        let task = TaskService::new(store).update(&actor, id, request.into())?;
        Ok(ApiResponse::ok(&TaskView::load(&store, task)?))
    })
}

/// `DELETE /tasks/{id}` → 204.
pub fn delete_task(conn: &Connection, actor_id: Option<UserId>, id: TaskId) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        TaskService::new(store).delete(&actor, id)?;
        Ok(ApiResponse::no_content())
    })
}

/// `POST /tasks/{id}/assign` body `{responsible_id}`
pub fn assign_task(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: TaskId,
    body: &str,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: AssignTaskRequest = parse_body(body)?;
        let Some(responsible_id) = request.responsible_id else {
            return Err(ApiResponse::detail(400, "responsible_id is required"));
        };
        let task = TaskService::new(store).assign(&actor, id, responsible_id)?;
        Ok(ApiResponse::ok(&TaskView::load(&store, task)?))
    })
}

/// `POST /tasks/{id}/status` body `{status}`
pub fn change_task_status(
    conn: &Connection,
    actor_id: Option<UserId>,
    id: TaskId,
    body: &str,
) -> ApiResponse {
    run(conn, |store| {
        let actor = authenticate(&store, actor_id)?;
        let request: ChangeStatusRequest = parse_body(body)?;
        let Some(status) = request.status else {
            return Err(ApiResponse::detail(400, "status is required"));
        };
        let task = TaskService::new(store).change_status(&actor, id, &status)?;
        Ok(ApiResponse::ok(&TaskView::load(&store, task)?))
    })
}
