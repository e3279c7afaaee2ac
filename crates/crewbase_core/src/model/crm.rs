//! CRM records: locations, customers and their contact persons.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

pub type LocationId = i64;
pub type CustomerId = i64;
pub type ContactPersonId = i64;

/// Physical address, optionally geocoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub street: String,
    pub zipcode: String,
    pub city: String,
    pub country: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

impl Location {
    /// Human-readable label, e.g. `Main Street 1, Malmo - Sweden`.
    pub fn descriptive(&self) -> String {
        format!("{}, {} - {}", self.street, self.city, self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub customer_number: String,
    pub registration_number: String,
    pub location_id: Option<LocationId>,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

impl Customer {
    /// Human-readable label, e.g. `Volvo, C-1042`.
    pub fn descriptive(&self) -> String {
        format!("{}, {}", self.name, self.customer_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPerson {
    pub id: ContactPersonId,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub customer_id: CustomerId,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

/// Fields required to insert a new location row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub street: String,
    pub zipcode: String,
    pub city: String,
    pub country: String,
}

/// Fields required to insert a new customer row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub customer_number: String,
    pub registration_number: String,
    pub location_id: Option<LocationId>,
}

impl NewCustomer {
    /// Creates a draft carrying only the customer name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Fields required to insert a new contact person row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContactPerson {
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub customer_id: CustomerId,
}
