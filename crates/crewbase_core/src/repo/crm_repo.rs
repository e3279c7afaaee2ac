//! CRM repository: locations, customers and contact persons.
//!
//! # Invariants
//! - Contact persons live and die with their customer; locations are shared
//!   references and never cascade.

use crate::model::crm::{
    ContactPerson, ContactPersonId, Customer, CustomerId, Location, LocationId, NewContactPerson,
    NewCustomer, NewLocation,
};
use crate::model::user::UserId;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const LOCATION_SELECT_SQL: &str = "SELECT
    id,
    description,
    latitude,
    longitude,
    street,
    zipcode,
    city,
    country,
    created_at,
    updated_at,
    created_by,
    updated_by
FROM locations";

const CUSTOMER_SELECT_SQL: &str = "SELECT
    id,
    name,
    customer_number,
    registration_number,
    location_id,
    created_at,
    updated_at,
    created_by,
    updated_by
FROM customers";

const CONTACT_PERSON_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    title,
    customer_id,
    created_at,
    updated_at,
    created_by,
    updated_by
FROM contact_persons";

/// Repository interface for CRM records.
pub trait CrmRepository {
    fn create_location(&self, location: &NewLocation, actor: Option<UserId>)
        -> RepoResult<Location>;
    fn get_location(&self, id: LocationId) -> RepoResult<Option<Location>>;
    fn list_locations(&self) -> RepoResult<Vec<Location>>;
    fn update_location(&self, location: &Location, actor: Option<UserId>) -> RepoResult<Location>;
    fn delete_location(&self, id: LocationId) -> RepoResult<()>;

    fn create_customer(&self, customer: &NewCustomer, actor: Option<UserId>)
        -> RepoResult<Customer>;
    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>>;
    fn list_customers(&self) -> RepoResult<Vec<Customer>>;
    fn update_customer(&self, customer: &Customer, actor: Option<UserId>) -> RepoResult<Customer>;
    fn delete_customer(&self, id: CustomerId) -> RepoResult<()>;

    fn create_contact_person(
        &self,
        person: &NewContactPerson,
        actor: Option<UserId>,
    ) -> RepoResult<ContactPerson>;
    fn get_contact_person(&self, id: ContactPersonId) -> RepoResult<Option<ContactPerson>>;
    fn list_contact_persons(&self) -> RepoResult<Vec<ContactPerson>>;
    /// Lists the contact persons of one customer, ordered by id.
    fn contact_persons_by_customer(&self, customer_id: CustomerId)
        -> RepoResult<Vec<ContactPerson>>;
    fn update_contact_person(
        &self,
        person: &ContactPerson,
        actor: Option<UserId>,
    ) -> RepoResult<ContactPerson>;
    fn delete_contact_person(&self, id: ContactPersonId) -> RepoResult<()>;
}

/// SQLite-backed CRM repository.
pub struct SqliteCrmRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCrmRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["locations", "customers", "contact_persons"])?;
        Ok(Self { conn })
    }
}

impl CrmRepository for SqliteCrmRepository<'_> {
    fn create_location(
        &self,
        location: &NewLocation,
        actor: Option<UserId>,
    ) -> RepoResult<Location> {
        self.conn.execute(
            "INSERT INTO locations (
                description,
                latitude,
                longitude,
                street,
                zipcode,
                city,
                country,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                location.description.as_str(),
                location.latitude,
                location.longitude,
                location.street.as_str(),
                location.zipcode.as_str(),
                location.city.as_str(),
                location.country.as_str(),
                actor,
                actor,
            ],
        )?;

        load_required_location(self.conn, self.conn.last_insert_rowid())
    }

    fn get_location(&self, id: LocationId) -> RepoResult<Option<Location>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LOCATION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_location_row(row)?));
        }
        Ok(None)
    }

    fn list_locations(&self) -> RepoResult<Vec<Location>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LOCATION_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut locations = Vec::new();
        while let Some(row) = rows.next()? {
            locations.push(parse_location_row(row)?);
        }
        Ok(locations)
    }

    fn update_location(&self, location: &Location, actor: Option<UserId>) -> RepoResult<Location> {
        let changed = self.conn.execute(
            "UPDATE locations
             SET
                description = ?2,
                latitude = ?3,
                longitude = ?4,
                street = ?5,
                zipcode = ?6,
                city = ?7,
                country = ?8,
                updated_at = (strftime('%s', 'now') * 1000),
                updated_by = ?9
             WHERE id = ?1;",
            params![
                location.id,
                location.description.as_str(),
                location.latitude,
                location.longitude,
                location.street.as_str(),
                location.zipcode.as_str(),
                location.city.as_str(),
                location.country.as_str(),
                actor,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "location",
                id: location.id,
            });
        }

        load_required_location(self.conn, location.id)
    }

    fn delete_location(&self, id: LocationId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM locations WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "location",
                id,
            });
        }
        Ok(())
    }

    fn create_customer(
        &self,
        customer: &NewCustomer,
        actor: Option<UserId>,
    ) -> RepoResult<Customer> {
        self.conn.execute(
            "INSERT INTO customers (
                name,
                customer_number,
                registration_number,
                location_id,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                customer.name.as_str(),
                customer.customer_number.as_str(),
                customer.registration_number.as_str(),
                customer.location_id,
                actor,
                actor,
            ],
        )?;

        load_required_customer(self.conn, self.conn.last_insert_rowid())
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_customer_row(row)?));
        }
        Ok(None)
    }

    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(parse_customer_row(row)?);
        }
        Ok(customers)
    }

    fn update_customer(&self, customer: &Customer, actor: Option<UserId>) -> RepoResult<Customer> {
        let changed = self.conn.execute(
            "UPDATE customers
             SET
                name = ?2,
                customer_number = ?3,
                registration_number = ?4,
                location_id = ?5,
                updated_at = (strftime('%s', 'now') * 1000),
                updated_by = ?6
             WHERE id = ?1;",
            params![
                customer.id,
                customer.name.as_str(),
                customer.customer_number.as_str(),
                customer.registration_number.as_str(),
                customer.location_id,
                actor,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "customer",
                id: customer.id,
            });
        }

        load_required_customer(self.conn, customer.id)
    }

    fn delete_customer(&self, id: CustomerId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM customers WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "customer",
                id,
            });
        }
        Ok(())
    }

    fn create_contact_person(
        &self,
        person: &NewContactPerson,
        actor: Option<UserId>,
    ) -> RepoResult<ContactPerson> {
        self.conn.execute(
            "INSERT INTO contact_persons (
                first_name,
                last_name,
                title,
                customer_id,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                person.first_name.as_str(),
                person.last_name.as_str(),
                person.title.as_str(),
                person.customer_id,
                actor,
                actor,
            ],
        )?;

        load_required_contact_person(self.conn, self.conn.last_insert_rowid())
    }

    fn get_contact_person(&self, id: ContactPersonId) -> RepoResult<Option<ContactPerson>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_PERSON_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_person_row(row)?));
        }
        Ok(None)
    }

    fn list_contact_persons(&self) -> RepoResult<Vec<ContactPerson>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_PERSON_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut persons = Vec::new();
        while let Some(row) = rows.next()? {
            persons.push(parse_contact_person_row(row)?);
        }
        Ok(persons)
    }

    fn contact_persons_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> RepoResult<Vec<ContactPerson>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_PERSON_SELECT_SQL} WHERE customer_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([customer_id])?;
        let mut persons = Vec::new();
        while let Some(row) = rows.next()? {
            persons.push(parse_contact_person_row(row)?);
        }
        Ok(persons)
    }

    fn update_contact_person(
        &self,
        person: &ContactPerson,
        actor: Option<UserId>,
    ) -> RepoResult<ContactPerson> {
        let changed = self.conn.execute(
            "UPDATE contact_persons
             SET
                first_name = ?2,
                last_name = ?3,
                title = ?4,
                customer_id = ?5,
                updated_at = (strftime('%s', 'now') * 1000),
                updated_by = ?6
             WHERE id = ?1;",
            params![
                person.id,
                person.first_name.as_str(),
                person.last_name.as_str(),
                person.title.as_str(),
                person.customer_id,
                actor,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "contact person",
                id: person.id,
            });
        }

        load_required_contact_person(self.conn, person.id)
    }

    fn delete_contact_person(&self, id: ContactPersonId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contact_persons WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "contact person",
                id,
            });
        }
        Ok(())
    }
}

fn load_required_location(conn: &Connection, id: LocationId) -> RepoResult<Location> {
    let mut stmt = conn.prepare(&format!("{LOCATION_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_location_row(row);
    }
    Err(RepoError::NotFound {
        entity: "location",
        id,
    })
}

fn load_required_customer(conn: &Connection, id: CustomerId) -> RepoResult<Customer> {
    let mut stmt = conn.prepare(&format!("{CUSTOMER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_customer_row(row);
    }
    Err(RepoError::NotFound {
        entity: "customer",
        id,
    })
}

fn load_required_contact_person(conn: &Connection, id: ContactPersonId) -> RepoResult<ContactPerson> {
    let mut stmt = conn.prepare(&format!("{CONTACT_PERSON_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_contact_person_row(row);
    }
    Err(RepoError::NotFound {
        entity: "contact person",
        id,
    })
}

fn parse_location_row(row: &Row<'_>) -> RepoResult<Location> {
    Ok(Location {
        id: row.get("id")?,
        description: row.get("description")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        street: row.get("street")?,
        zipcode: row.get("zipcode")?,
        city: row.get("city")?,
        country: row.get("country")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    })
}

fn parse_customer_row(row: &Row<'_>) -> RepoResult<Customer> {
    Ok(Customer {
        id: row.get("id")?,
        name: row.get("name")?,
        customer_number: row.get("customer_number")?,
        registration_number: row.get("registration_number")?,
        location_id: row.get("location_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    })
}

fn parse_contact_person_row(row: &Row<'_>) -> RepoResult<ContactPerson> {
    Ok(ContactPerson {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        title: row.get("title")?,
        customer_id: row.get("customer_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    })
}
