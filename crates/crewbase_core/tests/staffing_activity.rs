use crewbase_core::db::open_db_in_memory;
use crewbase_core::model::activity::Activity;
use crewbase_core::{
    ActivityListQuery, ActivityRepository, DirectoryService, NewProject, NewProjectResponse,
    NewUser, ResponseKind, SqliteActivityRepository, SqliteCrmRepository,
    SqliteDirectoryRepository, SqliteProjectRepository, StaffingError, StaffingService,
};
use rusqlite::Connection;

#[test]
fn interested_response_produces_the_exact_feed_sentence() {
    let conn = open_db_in_memory().unwrap();
    let (user_id, project_id) = seed_jane_and_project(&conn);
    let staffing = staffing_service(&conn);

    let response = staffing
        .respond(&request(user_id, project_id, ResponseKind::Interested), None)
        .unwrap();

    let feed = activities(&conn);
    assert_eq!(feed.len(), 1);
    assert_eq!(
        feed[0].action,
        "Jane Doe is interested in the project Cool Project"
    );
    assert_eq!(feed[0].user_id, Some(user_id));
    assert_eq!(feed[0].project_response_id, Some(response.id));
}

#[test]
fn price_only_update_is_suppressed() {
    let conn = open_db_in_memory().unwrap();
    let (user_id, project_id) = seed_jane_and_project(&conn);
    let staffing = staffing_service(&conn);

    let response = staffing
        .respond(&request(user_id, project_id, ResponseKind::Interested), None)
        .unwrap();
    assert_eq!(activities(&conn).len(), 1);

    let updated = staffing
        .update_response(response.id, 1200, ResponseKind::Interested, None)
        .unwrap();
    assert_eq!(updated.price, 1200);
    assert_eq!(activities(&conn).len(), 1, "no entry for unchanged kind");
}

#[test]
fn kind_transitions_render_accepted_and_proposed_sentences() {
    let conn = open_db_in_memory().unwrap();
    let (user_id, project_id) = seed_jane_and_project(&conn);
    let staffing = staffing_service(&conn);

    let response = staffing
        .respond(&request(user_id, project_id, ResponseKind::Interested), None)
        .unwrap();
    staffing
        .update_response(response.id, 0, ResponseKind::Proposed, None)
        .unwrap();
    staffing
        .update_response(response.id, 0, ResponseKind::Accepted, None)
        .unwrap();

    let feed = activities(&conn);
    assert_eq!(feed.len(), 3);
    // Newest first.
    assert_eq!(
        feed[0].action,
        "Jane Doe was accepted for the project Cool Project"
    );
    assert_eq!(
        feed[1].action,
        "Jane Doe was proposed for the project Cool Project"
    );
}

#[test]
fn empty_and_rejected_kinds_produce_no_feed_entries() {
    let conn = open_db_in_memory().unwrap();
    let (user_id, project_id) = seed_jane_and_project(&conn);
    let staffing = staffing_service(&conn);

    let response = staffing
        .respond(&request(user_id, project_id, ResponseKind::Empty), None)
        .unwrap();
    staffing
        .update_response(response.id, 0, ResponseKind::Rejected, None)
        .unwrap();

    assert!(activities(&conn).is_empty());
}

#[test]
fn customer_name_extends_the_project_label() {
    let conn = open_db_in_memory().unwrap();
    let directory = DirectoryService::new(SqliteDirectoryRepository::try_new(&conn).unwrap());
    let user = directory
        .create_user(&NewUser::member("jane.doe@firm.se", "Jane Doe"), None)
        .unwrap();

    conn.execute(
        "INSERT INTO customers (name, customer_number) VALUES ('Volvo', 'C-1');",
        [],
    )
    .unwrap();
    let customer_id = conn.last_insert_rowid();

    let staffing = staffing_service(&conn);
    let mut draft = NewProject::titled("Cool Project");
    draft.customer_id = Some(customer_id);
    let project = staffing.create_project(&draft, None).unwrap();

    staffing
        .respond(&request(user.id, project.id, ResponseKind::Interested), None)
        .unwrap();

    let feed = activities(&conn);
    assert_eq!(
        feed[0].action,
        "Jane Doe is interested in the project Cool Project, Volvo"
    );
}

#[test]
fn vanished_user_skips_recording_without_failing_the_write() {
    let conn = open_db_in_memory().unwrap();
    let (user_id, project_id) = seed_jane_and_project(&conn);
    let staffing = staffing_service(&conn);

    let response = staffing
        .respond(&request(user_id, project_id, ResponseKind::Empty), None)
        .unwrap();
    assert!(activities(&conn).is_empty());

    // Deleting the user resets the response's user FK to NULL.
    let directory = DirectoryService::new(SqliteDirectoryRepository::try_new(&conn).unwrap());
    directory.delete_user(user_id).unwrap();

    let updated = staffing
        .update_response(response.id, 0, ResponseKind::Proposed, None)
        .unwrap();
    assert_eq!(updated.kind, ResponseKind::Proposed);
    assert_eq!(updated.user_id, None);
    assert!(activities(&conn).is_empty(), "skip, never fail");
}

#[test]
fn responding_for_missing_user_or_project_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let (user_id, project_id) = seed_jane_and_project(&conn);
    let staffing = staffing_service(&conn);

    let err = staffing
        .respond(&request(999, project_id, ResponseKind::Interested), None)
        .unwrap_err();
    assert!(matches!(err, StaffingError::UserNotFound(999)));

    let err = staffing
        .respond(&request(user_id, 999, ResponseKind::Interested), None)
        .unwrap_err();
    assert!(matches!(err, StaffingError::ProjectNotFound(999)));

    assert!(activities(&conn).is_empty());
}

#[test]
fn feed_listing_filters_by_user_and_honors_limit() {
    let conn = open_db_in_memory().unwrap();
    let directory = DirectoryService::new(SqliteDirectoryRepository::try_new(&conn).unwrap());
    let jane = directory
        .create_user(&NewUser::member("jane.doe@firm.se", "Jane Doe"), None)
        .unwrap();
    let john = directory
        .create_user(&NewUser::member("john@firm.se", "John"), None)
        .unwrap();

    let staffing = staffing_service(&conn);
    let project = staffing
        .create_project(&NewProject::titled("Cool Project"), None)
        .unwrap();

    staffing
        .respond(&request(jane.id, project.id, ResponseKind::Interested), None)
        .unwrap();
    staffing
        .respond(&request(john.id, project.id, ResponseKind::Proposed), None)
        .unwrap();

    let repo = SqliteActivityRepository::try_new(&conn).unwrap();
    let janes = repo
        .list_activities(&ActivityListQuery {
            user_id: Some(jane.id),
            limit: None,
        })
        .unwrap();
    assert_eq!(janes.len(), 1);
    assert_eq!(janes[0].user_id, Some(jane.id));

    let limited = repo
        .list_activities(&ActivityListQuery {
            user_id: None,
            limit: Some(1),
        })
        .unwrap();
    assert_eq!(limited.len(), 1);
}

fn staffing_service(
    conn: &Connection,
) -> StaffingService<
    SqliteProjectRepository<'_>,
    SqliteDirectoryRepository<'_>,
    SqliteCrmRepository<'_>,
> {
    StaffingService::new(
        SqliteProjectRepository::try_new(conn).unwrap(),
        SqliteDirectoryRepository::try_new(conn).unwrap(),
        SqliteCrmRepository::try_new(conn).unwrap(),
    )
}

fn seed_jane_and_project(conn: &Connection) -> (i64, i64) {
    let directory = DirectoryService::new(SqliteDirectoryRepository::try_new(conn).unwrap());
    let user = directory
        .create_user(&NewUser::member("jane.doe@firm.se", "Jane Doe"), None)
        .unwrap();

    let staffing = staffing_service(conn);
    let project = staffing
        .create_project(&NewProject::titled("Cool Project"), None)
        .unwrap();

    (user.id, project.id)
}

fn request(user_id: i64, project_id: i64, kind: ResponseKind) -> NewProjectResponse {
    NewProjectResponse {
        user_id,
        project_id,
        price: 0,
        kind,
    }
}

fn activities(conn: &Connection) -> Vec<Activity> {
    let repo = SqliteActivityRepository::try_new(conn).unwrap();
    repo.list_activities(&ActivityListQuery::default()).unwrap()
}
