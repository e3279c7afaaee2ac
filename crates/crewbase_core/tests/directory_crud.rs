use crewbase_core::db::open_db_in_memory;
use crewbase_core::model::org::{NewGroup, NewRole};
use crewbase_core::{
    DirectoryService, DirectoryServiceError, NewUser, SqliteDirectoryRepository, UserKind,
};

#[test]
fn user_round_trips_with_audit_stamps() {
    let conn = open_db_in_memory().unwrap();
    let service = DirectoryService::new(SqliteDirectoryRepository::try_new(&conn).unwrap());

    let admin = service
        .create_user(&NewUser::member("admin@firm.se", "Admin"), None)
        .unwrap();
    assert_eq!(admin.created_by, None);

    let created = service
        .create_user(&NewUser::member("jane.doe@firm.se", "Jane Doe"), Some(admin.id))
        .unwrap();
    assert_eq!(created.email, "jane.doe@firm.se");
    assert_eq!(created.name.as_deref(), Some("Jane Doe"));
    assert_eq!(created.kind, UserKind::Member);
    assert!(!created.verified);
    assert_eq!(created.created_by, Some(admin.id));
    assert_eq!(created.updated_by, Some(admin.id));
    assert!(created.registered_at > 0);

    let fetched = service
        .get_user_by_email("jane.doe@firm.se")
        .unwrap()
        .unwrap();
    assert_eq!(fetched, created);

    let mut edited = created.clone();
    edited.name = Some("Jane D.".to_string());
    let updated = service.update_user(&edited, Some(admin.id)).unwrap();
    assert_eq!(updated.name.as_deref(), Some("Jane D."));
    assert_eq!(updated.updated_by, Some(admin.id));

    let verified = service.verify_user(created.id, Some(admin.id)).unwrap();
    assert!(verified.verified);

    service.delete_user(created.id).unwrap();
    assert!(service.get_user(created.id).unwrap().is_none());
}

#[test]
fn malformed_email_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = DirectoryService::new(SqliteDirectoryRepository::try_new(&conn).unwrap());

    let err = service
        .create_user(&NewUser::member("not-an-email", "Jane"), None)
        .unwrap_err();
    assert!(matches!(err, DirectoryServiceError::InvalidEmail(_)));
    assert!(service.list_users().unwrap().is_empty());
}

#[test]
fn duplicate_email_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = DirectoryService::new(SqliteDirectoryRepository::try_new(&conn).unwrap());

    service
        .create_user(&NewUser::member("jane@firm.se", "Jane"), None)
        .unwrap();
    let err = service
        .create_user(&NewUser::member("jane@firm.se", "Impostor"), None)
        .unwrap_err();
    assert!(matches!(err, DirectoryServiceError::EmailTaken(_)));
    assert_eq!(service.list_users().unwrap().len(), 1);
}

#[test]
fn assigning_a_missing_role_or_group_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = DirectoryService::new(SqliteDirectoryRepository::try_new(&conn).unwrap());

    let mut with_role = NewUser::member("a@firm.se", "A");
    with_role.role_id = Some(42);
    let err = service.create_user(&with_role, None).unwrap_err();
    assert!(matches!(err, DirectoryServiceError::RoleNotFound(42)));

    let mut with_group = NewUser::member("b@firm.se", "B");
    with_group.group_id = Some(42);
    let err = service.create_user(&with_group, None).unwrap_err();
    assert!(matches!(err, DirectoryServiceError::GroupNotFound(42)));
}

#[test]
fn role_crud_round_trips_and_checks_parents() {
    let conn = open_db_in_memory().unwrap();
    let service = DirectoryService::new(SqliteDirectoryRepository::try_new(&conn).unwrap());

    let err = service
        .create_role(
            &NewRole {
                name: "Orphan".to_string(),
                parent_role_id: Some(42),
            },
            None,
        )
        .unwrap_err();
    assert!(matches!(err, DirectoryServiceError::RoleNotFound(42)));

    let root = service
        .create_role(
            &NewRole {
                name: "Engineering".to_string(),
                parent_role_id: None,
            },
            None,
        )
        .unwrap();

    let mut renamed = root.clone();
    renamed.name = "Tech".to_string();
    let updated = service.update_role(&renamed, None).unwrap();
    assert_eq!(updated.name, "Tech");

    service.delete_role(root.id).unwrap();
    assert!(service.get_role(root.id).unwrap().is_none());
}

#[test]
fn deleting_a_group_detaches_members_instead_of_deleting_them() {
    let conn = open_db_in_memory().unwrap();
    let service = DirectoryService::new(SqliteDirectoryRepository::try_new(&conn).unwrap());

    let office = service
        .create_group(&NewGroup::named("Malmo"), None)
        .unwrap();
    let mut member = NewUser::member("c@firm.se", "Consultant");
    member.group_id = Some(office.id);
    let member = service.create_user(&member, None).unwrap();
    assert_eq!(member.group_id, Some(office.id));

    service.delete_group(office.id).unwrap();

    let survivor = service.get_user(member.id).unwrap().unwrap();
    assert_eq!(survivor.group_id, None);
}
