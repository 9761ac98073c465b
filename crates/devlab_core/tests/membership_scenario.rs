mod common;

use chrono::NaiveDate;
use common::register;
use devlab_core::db::open_db_in_memory;
use devlab_core::{
    NewProject, NewTask, NewTeam, ParticipationRepository, ParticipationService, ProjectService,
    ServiceError, SqliteStore, TaskService, TeamService, UserRole,
};

#[test]
fn coordinator_builds_project_leader_and_team() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let projects = ProjectService::new(store);
    let participations = ParticipationService::new(store);
    let teams = TeamService::new(store);
    let tasks = TaskService::new(store);

    let coordinator = register(&conn, "carla", UserRole::Coordinator);
    let s1 = register(&conn, "s1", UserRole::Student);
    let s2 = register(&conn, "s2", UserRole::Student);

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let p = projects
        .create(
            &coordinator,
            NewProject {
                name: "P".to_string(),
                start_date: Some(start),
                ..NewProject::default()
            },
        )
        .unwrap();
    assert_eq!(p.start_date, start);

    participations
        .add_participant(&coordinator, p.id, s1.id)
        .unwrap();
    participations.set_leader(&coordinator, p.id, s1.id).unwrap();

    let err = participations
        .set_leader(&coordinator, p.id, s2.id)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(
        store.project_leader(p.id).unwrap().unwrap().user_id,
        s1.id
    );

    let mut alpha = NewTeam::new("Alpha", p.id);
    alpha.leader_id = Some(s1.id);
    let team = teams.create(&coordinator, alpha).unwrap();
    assert_eq!(team.leader_id, Some(s1.id));

    let err = teams
        .create(&coordinator, NewTeam::new("Alpha", p.id))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(ref errors) if errors.contains("name")));

    let err = tasks
        .create(
            &coordinator,
            NewTask {
                title: "Kickoff".to_string(),
                project_id: Some(p.id),
                start_date: Some(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()),
                expected_end_date: Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
                ..NewTask::default()
            },
        )
        .unwrap_err();
    let ServiceError::Validation(errors) = err else {
        panic!("expected validation error, got {err}");
    };
    assert!(errors.contains("expected_end_date"));
}
