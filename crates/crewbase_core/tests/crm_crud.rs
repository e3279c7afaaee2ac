use crewbase_core::db::open_db_in_memory;
use crewbase_core::model::crm::{NewContactPerson, NewCustomer, NewLocation};
use crewbase_core::{
    CrmRepository, NewProject, ProjectRepository, SqliteCrmRepository, SqliteDirectoryRepository,
    SqliteProjectRepository, StaffingError, StaffingService,
};

#[test]
fn location_round_trips_with_descriptive_label() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCrmRepository::try_new(&conn).unwrap();

    let created = repo
        .create_location(
            &NewLocation {
                description: "HQ".to_string(),
                latitude: Some(55.605),
                longitude: Some(13.0038),
                street: "Main Street 1".to_string(),
                zipcode: "21119".to_string(),
                city: "Malmo".to_string(),
                country: "Sweden".to_string(),
            },
            None,
        )
        .unwrap();
    assert_eq!(created.descriptive(), "Main Street 1, Malmo - Sweden");

    let mut edited = created.clone();
    edited.city = "Lund".to_string();
    let updated = repo.update_location(&edited, None).unwrap();
    assert_eq!(updated.city, "Lund");

    repo.delete_location(created.id).unwrap();
    assert!(repo.get_location(created.id).unwrap().is_none());
}

#[test]
fn customer_round_trips_and_lists_its_projects() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCrmRepository::try_new(&conn).unwrap();

    let customer = repo
        .create_customer(
            &NewCustomer {
                name: "Volvo".to_string(),
                customer_number: "C-1042".to_string(),
                registration_number: "556012-3456".to_string(),
                location_id: None,
            },
            None,
        )
        .unwrap();
    assert_eq!(customer.descriptive(), "Volvo, C-1042");

    let projects = SqliteProjectRepository::try_new(&conn).unwrap();
    let mut draft = NewProject::titled("Cool Project");
    draft.customer_id = Some(customer.id);
    let project = projects.create_project(&draft, None).unwrap();
    projects
        .create_project(&NewProject::titled("Unrelated"), None)
        .unwrap();

    let attached = projects.projects_by_customer(customer.id).unwrap();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].id, project.id);
}

#[test]
fn deleting_a_customer_cascades_contacts_and_detaches_projects() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCrmRepository::try_new(&conn).unwrap();

    let customer = repo.create_customer(&NewCustomer::named("Volvo"), None).unwrap();
    let contact = repo
        .create_contact_person(
            &NewContactPerson {
                first_name: "Sven".to_string(),
                last_name: "Svensson".to_string(),
                title: "CTO".to_string(),
                customer_id: customer.id,
            },
            None,
        )
        .unwrap();

    let projects = SqliteProjectRepository::try_new(&conn).unwrap();
    let mut draft = NewProject::titled("Cool Project");
    draft.customer_id = Some(customer.id);
    let project = projects.create_project(&draft, None).unwrap();

    repo.delete_customer(customer.id).unwrap();

    assert!(repo.get_contact_person(contact.id).unwrap().is_none());
    let detached = projects.get_project(project.id).unwrap().unwrap();
    assert_eq!(detached.customer_id, None);
}

#[test]
fn contact_persons_are_listed_per_customer() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCrmRepository::try_new(&conn).unwrap();

    let volvo = repo.create_customer(&NewCustomer::named("Volvo"), None).unwrap();
    let saab = repo.create_customer(&NewCustomer::named("Saab"), None).unwrap();

    for (first_name, customer_id) in [("Sven", volvo.id), ("Anna", volvo.id), ("Erik", saab.id)] {
        repo.create_contact_person(
            &NewContactPerson {
                first_name: first_name.to_string(),
                last_name: "Svensson".to_string(),
                title: String::new(),
                customer_id,
            },
            None,
        )
        .unwrap();
    }

    let volvo_contacts = repo.contact_persons_by_customer(volvo.id).unwrap();
    assert_eq!(volvo_contacts.len(), 2);
    assert!(volvo_contacts
        .iter()
        .all(|person| person.customer_id == volvo.id));
}

#[test]
fn project_creation_validates_customer_and_location_references() {
    let conn = open_db_in_memory().unwrap();
    let staffing = StaffingService::new(
        SqliteProjectRepository::try_new(&conn).unwrap(),
        SqliteDirectoryRepository::try_new(&conn).unwrap(),
        SqliteCrmRepository::try_new(&conn).unwrap(),
    );

    let mut with_customer = NewProject::titled("Cool Project");
    with_customer.customer_id = Some(42);
    let err = staffing.create_project(&with_customer, None).unwrap_err();
    assert!(matches!(err, StaffingError::CustomerNotFound(42)));

    let mut with_location = NewProject::titled("Cool Project");
    with_location.location_id = Some(42);
    let err = staffing.create_project(&with_location, None).unwrap_err();
    assert!(matches!(err, StaffingError::LocationNotFound(42)));

    assert!(staffing.list_projects().unwrap().is_empty());
}
