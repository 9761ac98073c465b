mod common;

use chrono::NaiveDate;
use common::{enroll, project, register};
use devlab_core::db::open_db_in_memory;
use devlab_core::{
    NewProject, NewTask, NewTeam, ParticipationRepository, ProjectChanges, ProjectListQuery,
    ProjectService, ProjectStatus, ServiceError, SqliteStore, TaskService, TeamService, UserRole,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn create_defaults_and_rejects_reversed_dates() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap());
    let coordinator = register(&conn, "carla", UserRole::Coordinator);

    let created = project(&conn, &coordinator, "Robotics");
    assert_eq!(created.status, ProjectStatus::NotStarted);
    assert_eq!(created.creator_id, coordinator.id);
    assert!(!created.is_public);

    let err = service
        .create(
            &coordinator,
            NewProject {
                name: "Backwards".to_string(),
                start_date: Some(date(2024, 3, 10)),
                expected_end_date: Some(date(2024, 3, 1)),
                ..NewProject::default()
            },
        )
        .unwrap_err();
    let ServiceError::Validation(errors) = err else {
        panic!("expected validation error, got {err}");
    };
    assert!(errors.contains("expected_end_date"));
}

#[test]
fn visitors_cannot_create_projects() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap());
    let visitor = register(&conn, "vic", UserRole::Visitor);

    let err = service
        .create(
            &visitor,
            NewProject {
                name: "Nope".to_string(),
                ..NewProject::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Permission(_)));
}

#[test]
fn update_is_creator_only_and_revalidates_merged_dates() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap());
    let coordinator = register(&conn, "carla", UserRole::Coordinator);
    let other = register(&conn, "otto", UserRole::Coordinator);
    let created = service
        .create(
            &coordinator,
            NewProject {
                name: "Robotics".to_string(),
                start_date: Some(date(2024, 1, 1)),
                expected_end_date: Some(date(2024, 6, 1)),
                ..NewProject::default()
            },
        )
        .unwrap();

    let err = service
        .update(
            &other,
            created.id,
            ProjectChanges {
                name: Some("Hijacked".to_string()),
                ..ProjectChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Permission(_)));

    // Only the start date moves; the stored end date now precedes it.
    let err = service
        .update(
            &coordinator,
            created.id,
            ProjectChanges {
                start_date: Some(date(2024, 7, 1)),
                ..ProjectChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let updated = service
        .update(
            &coordinator,
            created.id,
            ProjectChanges {
                status: Some(ProjectStatus::InProgress),
                expected_end_date: Some(None),
                is_public: Some(true),
                ..ProjectChanges::default()
            },
        )
        .unwrap();
    assert_eq!(updated.status, ProjectStatus::InProgress);
    assert_eq!(updated.expected_end_date, None);
    assert!(updated.is_public);
    assert_eq!(updated.start_date, date(2024, 1, 1));
}

#[test]
fn list_orders_by_start_date_and_filters() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap());
    let coordinator = register(&conn, "carla", UserRole::Coordinator);
    let student = register(&conn, "ana", UserRole::Student);

    for (name, start, status, is_public) in [
        ("Later", date(2024, 5, 1), ProjectStatus::InProgress, false),
        ("Beta", date(2024, 1, 1), ProjectStatus::NotStarted, true),
        ("Alpha", date(2024, 1, 1), ProjectStatus::InProgress, false),
    ] {
        service
            .create(
                &coordinator,
                NewProject {
                    name: name.to_string(),
                    status: Some(status),
                    start_date: Some(start),
                    is_public,
                    ..NewProject::default()
                },
            )
            .unwrap();
    }

    let all = service
        .list(Some(&coordinator), ProjectListQuery::default())
        .unwrap();
    let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Later"]);

    let in_progress = service
        .list(
            Some(&coordinator),
            ProjectListQuery {
                status: Some(ProjectStatus::InProgress),
                ..ProjectListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(in_progress.len(), 2);

    let later = all.iter().find(|p| p.name == "Later").unwrap();
    enroll(&conn, &coordinator, later, &student);
    let mine = service
        .list(
            Some(&student),
            ProjectListQuery {
                participant_id: Some(student.id),
                ..ProjectListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, later.id);

    let anonymous = service.list(None, ProjectListQuery::default()).unwrap();
    assert_eq!(anonymous.len(), 1);
    assert_eq!(anonymous[0].name, "Beta");
    assert_eq!(service.list_public().unwrap().len(), 1);
}

#[test]
fn search_matches_name_description_and_status() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap());
    let coordinator = register(&conn, "carla", UserRole::Coordinator);

    for (name, description, status) in [
        ("Robotics Lab", "Line follower", ProjectStatus::NotStarted),
        ("Compilers", "Build a small ROBOT language", ProjectStatus::NotStarted),
        ("Databases", "Query planner", ProjectStatus::Completed),
    ] {
        service
            .create(
                &coordinator,
                NewProject {
                    name: name.to_string(),
                    description: description.to_string(),
                    status: Some(status),
                    ..NewProject::default()
                },
            )
            .unwrap();
    }

    let search = |term: &str| -> Vec<String> {
        let mut names: Vec<_> = service
            .list(
                Some(&coordinator),
                ProjectListQuery {
                    search: Some(term.to_string()),
                    ..ProjectListQuery::default()
                },
            )
            .unwrap()
            .into_iter()
            .map(|project| project.name)
            .collect();
        names.sort();
        names
    };

    assert_eq!(search("robot"), vec!["Compilers", "Robotics Lab"]);
    assert_eq!(search(" planner "), vec!["Databases"]);
    assert_eq!(search("completed"), vec!["Databases"]);
    assert!(search("%").is_empty());
    assert_eq!(search("   ").len(), 3);
}

#[test]
fn anonymous_reads_need_public_projects() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap());
    let coordinator = register(&conn, "carla", UserRole::Coordinator);
    let private = project(&conn, &coordinator, "Private");

    assert!(matches!(
        service.get(None, private.id).unwrap_err(),
        ServiceError::Unauthenticated
    ));
    assert_eq!(service.get(Some(&coordinator), private.id).unwrap().id, private.id);
}

#[test]
fn set_advisor_requires_coordinating_creator_and_professor() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let service = ProjectService::new(store);
    let coordinator = register(&conn, "carla", UserRole::Coordinator);
    let professor = register(&conn, "paulo", UserRole::Professor);
    let student = register(&conn, "ana", UserRole::Student);
    let created = project(&conn, &coordinator, "Robotics");

    let err = service
        .set_advisor(&professor, created.id, professor.id)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Permission(_)));

    let err = service
        .set_advisor(&coordinator, created.id, student.id)
        .unwrap_err();
    let ServiceError::Validation(errors) = err else {
        panic!("expected validation error, got {err}");
    };
    assert!(errors.contains("professor_id"));

    let updated = service
        .set_advisor(&coordinator, created.id, professor.id)
        .unwrap();
    assert_eq!(updated.advisor_id, Some(professor.id));
    assert!(store.is_active_participant(created.id, professor.id).unwrap());

    // Repeating the assignment keeps a single participation row.
    service
        .set_advisor(&coordinator, created.id, professor.id)
        .unwrap();
    assert_eq!(store.list_participations(created.id, true).unwrap().len(), 1);
}

#[test]
fn professor_created_projects_cannot_take_advisors_from_their_creator() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap());
    let professor = register(&conn, "paulo", UserRole::Professor);
    let created = project(&conn, &professor, "Own");

    let err = service
        .set_advisor(&professor, created.id, professor.id)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Permission(_)));
}

#[test]
fn delete_cascades_to_teams_and_tasks() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let projects = ProjectService::new(store);
    let coordinator = register(&conn, "carla", UserRole::Coordinator);
    let student = register(&conn, "ana", UserRole::Student);
    let created = project(&conn, &coordinator, "Robotics");
    enroll(&conn, &coordinator, &created, &student);

    let team = TeamService::new(store)
        .create(&coordinator, NewTeam::new("Alpha", created.id))
        .unwrap();
    let task = TaskService::new(store)
        .create(
            &student,
            NewTask {
                title: "Wire motors".to_string(),
                team_id: Some(team.id),
                ..NewTask::default()
            },
        )
        .unwrap();

    let err = projects.delete(&student, created.id).unwrap_err();
    assert!(matches!(err, ServiceError::Permission(_)));

    projects.delete(&coordinator, created.id).unwrap();
    assert!(matches!(
        TeamService::new(store).get(&coordinator, team.id).unwrap_err(),
        ServiceError::NotFound { entity: "team", .. }
    ));
    assert!(matches!(
        TaskService::new(store).get(task.id).unwrap_err(),
        ServiceError::NotFound { entity: "task", .. }
    ));
    assert!(store.list_participations(created.id, true).unwrap().is_empty());
}

#[test]
fn dashboard_aggregates_people_teams_and_tasks() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let projects = ProjectService::new(store);
    let coordinator = register(&conn, "carla", UserRole::Coordinator);
    let professor = register(&conn, "paulo", UserRole::Professor);
    let ana = register(&conn, "ana", UserRole::Student);
    let bia = register(&conn, "bia", UserRole::Student);
    let created = project(&conn, &coordinator, "Robotics");
    enroll(&conn, &coordinator, &created, &ana);
    enroll(&conn, &coordinator, &created, &bia);
    projects
        .set_advisor(&coordinator, created.id, professor.id)
        .unwrap();
    devlab_core::ParticipationService::new(store)
        .set_leader(&coordinator, created.id, ana.id)
        .unwrap();

    let mut new_team = NewTeam::new("Alpha", created.id);
    new_team.leader_id = Some(ana.id);
    new_team.member_ids = vec![bia.id];
    TeamService::new(store).create(&coordinator, new_team).unwrap();

    let tasks = TaskService::new(store);
    for title in ["One", "Two"] {
        tasks
            .create(
                &ana,
                NewTask {
                    title: title.to_string(),
                    project_id: Some(created.id),
                    ..NewTask::default()
                },
            )
            .unwrap();
    }

    let dashboard = projects.dashboard(Some(&coordinator), created.id).unwrap();
    assert_eq!(dashboard.project.id, created.id);
    assert_eq!(dashboard.creator.unwrap().id, coordinator.id);
    assert_eq!(dashboard.advisor.unwrap().id, professor.id);
    assert_eq!(dashboard.leader.unwrap().id, ana.id);
    assert_eq!(dashboard.counts.participants, 3);
    assert_eq!(dashboard.counts.teams, 1);
    assert_eq!(dashboard.counts.tasks, 2);
    assert_eq!(dashboard.counts.tasks_by_status["not_started"], 2);
    assert_eq!(dashboard.counts.tasks_by_status["completed"], 0);
    assert_eq!(dashboard.teams[0].leader.as_ref().unwrap().id, ana.id);
    assert_eq!(dashboard.teams[0].members.len(), 2);
}
