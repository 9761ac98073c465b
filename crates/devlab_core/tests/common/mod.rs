#![allow(dead_code)]

use devlab_core::{
    NewProject, NewUser, ParticipationService, Project, ProjectService, SqliteStore, User,
    UserRole, UserService,
};
use rusqlite::Connection;

pub fn register(conn: &Connection, username: &str, role: UserRole) -> User {
    let store = SqliteStore::try_new(conn).unwrap();
    UserService::new(store)
        .register(NewUser::new(
            username,
            format!("{username}@example.edu"),
            format!("{username} name"),
            role,
        ))
        .unwrap()
}

pub fn register_staff(conn: &Connection, username: &str) -> User {
    let store = SqliteStore::try_new(conn).unwrap();
    let mut data = NewUser::new(
        username,
        format!("{username}@example.edu"),
        "Staff",
        UserRole::Professor,
    );
    data.is_staff = true;
    UserService::new(store).register(data).unwrap()
}

pub fn project(conn: &Connection, creator: &User, name: &str) -> Project {
    let store = SqliteStore::try_new(conn).unwrap();
    ProjectService::new(store)
        .create(
            creator,
            NewProject {
                name: name.to_string(),
                ..NewProject::default()
            },
        )
        .unwrap()
}

pub fn enroll(conn: &Connection, creator: &User, project: &Project, user: &User) {
    let store = SqliteStore::try_new(conn).unwrap();
    ParticipationService::new(store)
        .add_participant(creator, project.id, user.id)
        .unwrap();
}
