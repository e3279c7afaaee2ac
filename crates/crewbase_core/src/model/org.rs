//! Organizational directory nodes: roles and groups.
//!
//! # Responsibility
//! - Define the two hierarchy node records users are assigned to.
//!
//! # Invariants
//! - `parent_*_id` edges form a forest in healthy data; resolvers must
//!   still terminate if an edit introduces a cycle.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

pub type RoleId = i64;
pub type GroupId = i64;

/// Competence role node, e.g. "Backend" under "Engineering".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub parent_role_id: Option<RoleId>,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

/// Office/organizational group node, e.g. a branch office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub address: Option<String>,
    pub zipcode: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub parent_group_id: Option<GroupId>,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

/// Fields required to insert a new role node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub parent_role_id: Option<RoleId>,
}

/// Fields required to insert a new group node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub address: Option<String>,
    pub zipcode: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub parent_group_id: Option<GroupId>,
}

impl NewGroup {
    /// Creates a draft carrying only the group name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
