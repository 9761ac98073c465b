mod common;

use common::{project, register, register_staff};
use devlab_core::db::open_db_in_memory;
use devlab_core::{
    NewUser, ProfileChanges, ServiceError, SqliteStore, UserRepository, UserRole, UserService,
};

#[test]
fn register_and_list_by_role() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());

    register(&conn, "zeca", UserRole::Student);
    register(&conn, "ana", UserRole::Student);
    register(&conn, "carla", UserRole::Coordinator);

    let students = service.list(Some(UserRole::Student)).unwrap();
    let names: Vec<_> = students.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["ana", "zeca"]);
    assert_eq!(service.list(None).unwrap().len(), 3);
}

#[test]
fn duplicate_username_and_email_conflict() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());
    register(&conn, "ana", UserRole::Student);

    let err = service
        .register(NewUser::new(
            "ana",
            "other@example.edu",
            "Ana Two",
            UserRole::Student,
        ))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(ref errors) if errors.contains("username")));

    let err = service
        .register(NewUser::new(
            "ana2",
            "ana@example.edu",
            "Ana Two",
            UserRole::Student,
        ))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(ref errors) if errors.contains("email")));
}

#[test]
fn duplicate_registration_names_every_taken_field() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());
    register(&conn, "ana", UserRole::Student);

    let err = service
        .register(NewUser::new(
            "ana",
            "ana@example.edu",
            "Ana Again",
            UserRole::Student,
        ))
        .unwrap_err();
    let ServiceError::Conflict(errors) = err else {
        panic!("expected conflict, got {err}");
    };
    assert_eq!(
        errors.messages("username"),
        ["a user with that username already exists"]
    );
    assert_eq!(
        errors.messages("email"),
        ["a user with that email already exists"]
    );
    assert_eq!(errors.fields().len(), 2);
}

#[test]
fn malformed_registration_is_field_keyed() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());

    let err = service
        .register(NewUser::new("bad name", "nope", "", UserRole::Visitor))
        .unwrap_err();
    let ServiceError::Validation(errors) = err else {
        panic!("expected validation error, got {err}");
    };
    assert!(errors.contains("username"));
    assert!(errors.contains("email"));
    assert!(errors.contains("name"));
}

#[test]
fn profile_edits_are_self_or_staff() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());
    let ana = register(&conn, "ana", UserRole::Student);
    let bia = register(&conn, "bia", UserRole::Student);
    let staff = register_staff(&conn, "admin");

    let changes = ProfileChanges {
        name: Some("Ana Souza".to_string()),
        ..ProfileChanges::default()
    };
    let err = service
        .update_profile(&bia, ana.id, changes.clone())
        .unwrap_err();
    assert!(matches!(err, ServiceError::Permission(_)));

    let updated = service.update_profile(&ana, ana.id, changes).unwrap();
    assert_eq!(updated.name, "Ana Souza");
    assert_eq!(updated.role, UserRole::Student);

    let updated = service
        .update_profile(
            &staff,
            ana.id,
            ProfileChanges {
                email: Some("ana.souza@example.edu".to_string()),
                ..ProfileChanges::default()
            },
        )
        .unwrap();
    assert_eq!(updated.email, "ana.souza@example.edu");
}

#[test]
fn profile_email_collision_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());
    let ana = register(&conn, "ana", UserRole::Student);
    register(&conn, "bia", UserRole::Student);

    let err = service
        .update_profile(
            &ana,
            ana.id,
            ProfileChanges {
                email: Some("bia@example.edu".to_string()),
                ..ProfileChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(ref errors) if errors.contains("email")));
}

#[test]
fn delete_is_staff_only_and_blocked_for_project_creators() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let service = UserService::new(store);
    let staff = register_staff(&conn, "admin");
    let coordinator = register(&conn, "carla", UserRole::Coordinator);
    let student = register(&conn, "ana", UserRole::Student);
    project(&conn, &coordinator, "Robotics");

    let err = service.delete(&coordinator, student.id).unwrap_err();
    assert!(matches!(err, ServiceError::Permission(_)));

    let err = service.delete(&staff, coordinator.id).unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(ref errors) if errors.contains("user_id")));

    service.delete(&staff, student.id).unwrap();
    assert!(store.get_user(student.id).unwrap().is_none());

    let err = service.delete(&staff, student.id).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "user", .. }));
}
