//! Project and staffing response models.
//!
//! # Responsibility
//! - Define staffable projects and per-user responses to them.
//!
//! # Invariants
//! - A response's `user_id`/`project_id` may become `None` after directory
//!   or project deletions; the feed recorder tolerates both.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::crm::{CustomerId, LocationId};
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

pub type ProjectId = i64;
pub type ProjectResponseId = i64;

/// How a consultant relates to a project staffing request.
///
/// Stored as a TEXT column; the repository owns the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// No stance recorded yet.
    Empty,
    /// The consultant flagged interest themselves.
    Interested,
    /// Sales proposed the consultant to the customer.
    Proposed,
    /// The customer accepted the consultant.
    Accepted,
    /// The consultant or customer declined.
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    /// Unix epoch milliseconds. Should be <= `ends_on` when both are set.
    pub starts_on: Option<i64>,
    pub ends_on: Option<i64>,
    pub hours: i64,
    pub customer_id: Option<CustomerId>,
    pub location_id: Option<LocationId>,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

/// One consultant's staffing stance on one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub id: ProjectResponseId,
    pub user_id: Option<UserId>,
    pub project_id: Option<ProjectId>,
    /// Offered hourly price; zero when not negotiated yet.
    pub price: i64,
    pub kind: ResponseKind,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

/// Fields required to insert a new project row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub starts_on: Option<i64>,
    pub ends_on: Option<i64>,
    pub hours: i64,
    pub customer_id: Option<CustomerId>,
    pub location_id: Option<LocationId>,
}

impl NewProject {
    /// Creates a draft carrying only the project title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Fields required to insert a new project response row.
///
/// Creation requires concrete user and project targets; the columns only
/// become `NULL` later if those rows are deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProjectResponse {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub price: i64,
    pub kind: ResponseKind,
}
