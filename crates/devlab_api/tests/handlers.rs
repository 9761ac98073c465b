use devlab_api::dto::{ProjectListParams, TaskListParams, TeamListParams};
use devlab_api::handlers;
use devlab_core::{open_db_in_memory, UserId};
use rusqlite::Connection;
use serde_json::{json, Value};

fn register(conn: &Connection, username: &str, role: &str) -> UserId {
    let body = json!({
        "username": username,
        "email": format!("{username}@example.edu"),
        "name": format!("{username} name"),
        "role": role,
    });
    let response = handlers::register_user(conn, &body.to_string());
    assert_eq!(response.status, 201, "{}", response.body);
    id_of(&response.body)
}

fn id_of(body: &Value) -> UserId {
    body["id"].as_str().unwrap().parse().unwrap()
}

#[test]
fn registration_hides_password_hash_and_rejects_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let body = json!({
        "username": "ana",
        "email": "ana@example.edu",
        "name": "Ana",
        "password_hash": "pbkdf2$secret",
        "role": "student",
    })
    .to_string();

    let created = handlers::register_user(&conn, &body);
    assert_eq!(created.status, 201);
    assert_eq!(created.body["role"], "student");
    assert!(created.body.get("password_hash").is_none());

    let duplicate = handlers::register_user(&conn, &body);
    assert_eq!(duplicate.status, 409);
    assert_eq!(
        duplicate.body,
        json!({
            "username": ["a user with that username already exists"],
            "email": ["a user with that email already exists"],
        })
    );

    let same_username = json!({
        "username": "ana",
        "email": "ana.two@example.edu",
        "name": "Ana Two",
        "role": "student",
    });
    let taken = handlers::register_user(&conn, &same_username.to_string());
    assert_eq!(taken.status, 409);
    assert!(taken.body.get("username").is_some());
    assert!(taken.body.get("email").is_none());

    let me = handlers::current_user(&conn, Some(id_of(&created.body)));
    assert_eq!(me.status, 200);
    assert_eq!(me.body["username"], "ana");
    assert_eq!(handlers::current_user(&conn, None).status, 401);
}

#[test]
fn profile_edits_are_limited_to_the_owner() {
    let conn = open_db_in_memory().unwrap();
    let ana = register(&conn, "ana", "student");
    let ben = register(&conn, "ben", "student");

    let denied = handlers::update_user(&conn, Some(ben), ana, r#"{"name":"Mallory"}"#);
    assert_eq!(denied.status, 403);

    let updated = handlers::update_user(&conn, Some(ana), ana, r#"{"name":"Ana Maria"}"#);
    assert_eq!(updated.status, 200);
    assert_eq!(updated.body["name"], "Ana Maria");
}

#[test]
fn project_membership_flow_over_handlers() {
    let conn = open_db_in_memory().unwrap();
    let coord = register(&conn, "coord", "coordinator");
    let s1 = register(&conn, "s1", "student");
    let s2 = register(&conn, "s2", "student");
    let visitor = register(&conn, "guest", "visitor");

    let rejected = handlers::create_project(&conn, Some(visitor), r#"{"name":"Nope"}"#);
    assert_eq!(rejected.status, 403);

    let reversed = handlers::create_project(
        &conn,
        Some(coord),
        r#"{"name":"Late","start_date":"2024-05-10","expected_end_date":"2024-05-01"}"#,
    );
    assert_eq!(reversed.status, 400);
    assert!(reversed.body.get("expected_end_date").is_some());

    let created = handlers::create_project(&conn, Some(coord), r#"{"name":"Robotics"}"#);
    assert_eq!(created.status, 201, "{}", created.body);
    assert_eq!(created.body["status"], "not_started");
    assert_eq!(created.body["is_public"], false);
    assert_eq!(created.body["creator"]["username"], "coord");
    let project_id = id_of(&created.body);

    assert_eq!(handlers::get_project(&conn, None, project_id).status, 401);
    let anonymous = handlers::list_projects(&conn, None, ProjectListParams::default());
    assert_eq!(anonymous.body, json!([]));

    let body = json!({ "user_id": s1 }).to_string();
    let added = handlers::add_participant(&conn, Some(coord), project_id, &body);
    assert_eq!(added.status, 201, "{}", added.body);
    assert_eq!(added.body["user"]["username"], "s1");
    assert_eq!(added.body["is_active"], true);

    let body = json!({ "user_id": visitor }).to_string();
    let not_student = handlers::add_participant(&conn, Some(coord), project_id, &body);
    assert_eq!(not_student.status, 400);
    assert!(not_student.body.get("user_id").is_some());

    let body = json!({ "user_id": s2 }).to_string();
    let by_student = handlers::add_participant(&conn, Some(s1), project_id, &body);
    assert_eq!(by_student.status, 403);

    let body = json!({ "user_id": s1 }).to_string();
    let leader = handlers::set_project_leader(&conn, Some(coord), project_id, &body);
    assert_eq!(leader.status, 200, "{}", leader.body);
    assert_eq!(leader.body["is_leader"], true);
    assert_eq!(leader.body["user"]["username"], "s1");

    let body = json!({ "user_id": s2 }).to_string();
    let outsider = handlers::set_project_leader(&conn, Some(coord), project_id, &body);
    assert_eq!(outsider.status, 400);

    let malformed = handlers::set_project_leader(&conn, Some(coord), project_id, "{user_id:");
    assert_eq!(malformed.status, 400);
    assert!(malformed.body.get("detail").is_some());

    let team_body = json!({ "name": "Alpha", "project_id": project_id, "leader_id": s1 });
    let team = handlers::create_team(&conn, Some(coord), &team_body.to_string());
    assert_eq!(team.status, 201, "{}", team.body);
    assert_eq!(team.body["leader"]["username"], "s1");
    assert_eq!(team.body["members"].as_array().unwrap().len(), 1);

    let same_name = json!({ "name": "Alpha", "project_id": project_id });
    let duplicate = handlers::create_team(&conn, Some(coord), &same_name.to_string());
    assert_eq!(duplicate.status, 409);
    assert!(duplicate.body.get("name").is_some());

    let params = ProjectListParams {
        search: Some("robo".to_string()),
        ..ProjectListParams::default()
    };
    let searched = handlers::list_projects(&conn, Some(coord), params);
    assert_eq!(searched.body.as_array().unwrap().len(), 1);
    assert_eq!(searched.body[0]["name"], "Robotics");

    let teams = handlers::list_teams(&conn, Some(s1), TeamListParams::default());
    assert_eq!(teams.body.as_array().unwrap().len(), 1);
    let hidden = handlers::list_teams(&conn, Some(s2), TeamListParams::default());
    assert_eq!(hidden.body, json!([]));

    let dashboard = handlers::project_dashboard(&conn, Some(coord), project_id);
    assert_eq!(dashboard.status, 200);
    assert_eq!(dashboard.body["leader"]["username"], "s1");
    assert_eq!(dashboard.body["counts"]["teams"], 1);

    let forbidden = handlers::delete_project(&conn, Some(s1), project_id);
    assert_eq!(forbidden.status, 403);
    let deleted = handlers::delete_project(&conn, Some(coord), project_id);
    assert_eq!(deleted.status, 204);
    assert!(deleted.body.is_null());
}

#[test]
fn task_endpoints_validate_inputs() {
    let conn = open_db_in_memory().unwrap();
    let coord = register(&conn, "coord", "coordinator");
    let s1 = register(&conn, "s1", "student");
    let project = handlers::create_project(&conn, Some(coord), r#"{"name":"Lab"}"#);
    let project_id = id_of(&project.body);
    let body = json!({ "user_id": s1 }).to_string();
    handlers::add_participant(&conn, Some(coord), project_id, &body);

    let reversed = json!({
        "title": "Report",
        "project_id": project_id,
        "start_date": "2024-05-10",
        "expected_end_date": "2024-05-01",
    });
    let invalid = handlers::create_task(&conn, Some(coord), &reversed.to_string());
    assert_eq!(invalid.status, 400);
    assert!(invalid.body.get("expected_end_date").is_some());

    let body = json!({
        "title": "Report",
        "project_id": project_id,
        "responsible_id": s1,
        "priority": 1,
    });
    let created = handlers::create_task(&conn, Some(coord), &body.to_string());
    assert_eq!(created.status, 201, "{}", created.body);
    assert_eq!(created.body["priority"], 1);
    assert_eq!(created.body["responsible"]["username"], "s1");
    let task_id = id_of(&created.body);

    let missing = handlers::assign_task(&conn, Some(coord), task_id, "{}");
    assert_eq!(missing.status, 400);
    assert_eq!(missing.body, json!({ "detail": ["responsible_id is required"] }));

    let unknown = handlers::change_task_status(&conn, Some(s1), task_id, r#"{"status":"done"}"#);
    assert_eq!(unknown.status, 400);
    assert!(unknown.body.get("status").is_some());

    let moved =
        handlers::change_task_status(&conn, Some(s1), task_id, r#"{"status":"in_progress"}"#);
    assert_eq!(moved.status, 200, "{}", moved.body);
    assert_eq!(moved.body["status"], "in_progress");

    let denied = handlers::update_task(&conn, Some(coord), task_id, r#"{"title":"Other"}"#);
    assert_eq!(denied.status, 403);

    let cleared = handlers::update_task(&conn, Some(s1), task_id, r#"{"responsible_id":null}"#);
    assert_eq!(cleared.status, 200, "{}", cleared.body);
    assert!(cleared.body["responsible"].is_null());

    let listed = handlers::list_tasks(&conn, Some(coord), TaskListParams::default());
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
    let params = TaskListParams {
        search: Some("repo".to_string()),
        ..TaskListParams::default()
    };
    let found = handlers::list_tasks(&conn, Some(coord), params);
    assert_eq!(found.body[0]["title"], "Report");
    let params = TaskListParams {
        search: Some("minutes".to_string()),
        ..TaskListParams::default()
    };
    assert_eq!(handlers::list_tasks(&conn, Some(coord), params).body, json!([]));
    assert_eq!(handlers::list_tasks(&conn, None, TaskListParams::default()).status, 401);
}
