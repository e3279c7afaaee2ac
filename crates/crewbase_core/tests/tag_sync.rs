use crewbase_core::db::open_db_in_memory;
use crewbase_core::{
    DirectoryService, NewUser, SqliteDirectoryRepository, SqliteTagRepository, Tag, TagDraft,
    TagOwner, TagService, TagServiceError,
};
use rusqlite::Connection;

#[test]
fn sync_applies_renames_creates_and_deletes_exactly() {
    let conn = open_db_in_memory().unwrap();
    let owner = TagOwner::User(create_user(&conn, "jane@firm.se"));
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let initial = service
        .set_tags(owner, vec![TagDraft::new("A"), TagDraft::new("B")])
        .unwrap();
    assert_eq!(titles(&initial), vec!["A", "B"]);
    let a_id = initial[0].id;
    let b_id = initial[1].id;

    let synced = service
        .set_tags(
            owner,
            vec![TagDraft::existing(a_id, "A2"), TagDraft::new("C")],
        )
        .unwrap();

    assert_eq!(synced.len(), 2);
    assert_eq!(synced[0].id, a_id);
    assert_eq!(synced[0].title, "A2");
    assert_eq!(synced[1].title, "C");
    assert_ne!(synced[1].id, b_id);
    assert!(service.get_tag(b_id).unwrap().is_none());
}

#[test]
fn sync_is_idempotent_once_ids_are_assigned() {
    let conn = open_db_in_memory().unwrap();
    let owner = TagOwner::User(create_user(&conn, "jane@firm.se"));
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let first = service
        .set_tags(owner, vec![TagDraft::new("Rust"), TagDraft::new("SQL")])
        .unwrap();

    let replay: Vec<TagDraft> = first
        .iter()
        .map(|tag| TagDraft::existing(tag.id, tag.title.clone()))
        .collect();
    let second = service.set_tags(owner, replay).unwrap();

    assert_eq!(first, second);
}

#[test]
fn foreign_tag_id_aborts_with_no_partial_writes() {
    let conn = open_db_in_memory().unwrap();
    let jane = TagOwner::User(create_user(&conn, "jane@firm.se"));
    let john = TagOwner::User(create_user(&conn, "john@firm.se"));
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let janes = service.set_tags(jane, vec![TagDraft::new("Rust")]).unwrap();
    let johns = service.set_tags(john, vec![TagDraft::new("Sales")]).unwrap();

    let err = service
        .set_tags(
            jane,
            vec![
                TagDraft::new("Fresh"),
                TagDraft::existing(johns[0].id, "Stolen"),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, TagServiceError::ForeignTag(id) if id == johns[0].id));

    // Nothing moved: no create, no rename, no delete, on either side.
    assert_eq!(service.tags_for_owner(jane).unwrap(), janes);
    assert_eq!(service.tags_for_owner(john).unwrap(), johns);
}

#[test]
fn unknown_tag_id_is_rejected_the_same_way() {
    let conn = open_db_in_memory().unwrap();
    let owner = TagOwner::User(create_user(&conn, "jane@firm.se"));
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let err = service
        .set_tags(owner, vec![TagDraft::existing(999, "X")])
        .unwrap_err();
    assert!(matches!(err, TagServiceError::ForeignTag(999)));
    assert!(service.tags_for_owner(owner).unwrap().is_empty());
}

#[test]
fn missing_owner_is_reported_as_owner_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let err = service
        .set_tags(TagOwner::User(42), vec![TagDraft::new("Rust")])
        .unwrap_err();
    assert!(matches!(err, TagServiceError::OwnerNotFound(_)));
}

#[test]
fn blank_titles_are_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let owner = TagOwner::User(create_user(&conn, "jane@firm.se"));
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let existing = service.set_tags(owner, vec![TagDraft::new("Rust")]).unwrap();

    let err = service
        .set_tags(owner, vec![TagDraft::new("Go"), TagDraft::new("   ")])
        .unwrap_err();
    assert!(matches!(err, TagServiceError::BlankTitle));
    assert_eq!(service.tags_for_owner(owner).unwrap(), existing);
}

#[test]
fn titles_are_trimmed_and_duplicates_are_allowed() {
    let conn = open_db_in_memory().unwrap();
    let owner = TagOwner::User(create_user(&conn, "jane@firm.se"));
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let synced = service
        .set_tags(
            owner,
            vec![
                TagDraft::new("  Rust  "),
                TagDraft::new("Rust"),
                TagDraft::new("rust"),
            ],
        )
        .unwrap();

    assert_eq!(titles(&synced), vec!["Rust", "Rust", "rust"]);
}

#[test]
fn sync_is_scoped_to_one_owner() {
    let conn = open_db_in_memory().unwrap();
    let jane = TagOwner::User(create_user(&conn, "jane@firm.se"));
    let john = TagOwner::User(create_user(&conn, "john@firm.se"));
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    service.set_tags(jane, vec![TagDraft::new("Rust")]).unwrap();
    let johns = service.set_tags(john, vec![TagDraft::new("Sales")]).unwrap();

    // Wiping Jane's tags must not touch John's.
    let wiped = service.set_tags(jane, Vec::new()).unwrap();
    assert!(wiped.is_empty());
    assert_eq!(service.tags_for_owner(john).unwrap(), johns);
}

#[test]
fn suggestions_aggregate_titles_across_owners() {
    let conn = open_db_in_memory().unwrap();
    let jane = TagOwner::User(create_user(&conn, "jane@firm.se"));
    let john = TagOwner::User(create_user(&conn, "john@firm.se"));
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    service
        .set_tags(jane, vec![TagDraft::new("Rust"), TagDraft::new("SQL")])
        .unwrap();
    service.set_tags(john, vec![TagDraft::new("Rust")]).unwrap();

    let suggestions = service.tag_suggestions().unwrap();
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].title, "Rust");
    assert_eq!(suggestions[0].count, 2);
    assert_eq!(suggestions[1].title, "SQL");
    assert_eq!(suggestions[1].count, 1);
}

fn create_user(conn: &Connection, email: &str) -> i64 {
    let directory = DirectoryService::new(SqliteDirectoryRepository::try_new(conn).unwrap());
    directory
        .create_user(&NewUser::member(email, "Test User"), None)
        .unwrap()
        .id
}

fn titles(tags: &[Tag]) -> Vec<&str> {
    tags.iter().map(|tag| tag.title.as_str()).collect()
}
