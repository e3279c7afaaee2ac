//! User domain model.
//!
//! # Responsibility
//! - Define the consultant/user record and its access tier.
//!
//! # Invariants
//! - `email` is unique across the directory.
//! - `role_id`/`group_id` may dangle to `None` when directory nodes are
//!   removed; they never point at a deleted row.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Serialize};

/// Stable identifier for a user row.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type UserId = i64;

/// Access tier for a user account.
///
/// Stored as an integer column; the repository owns the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserKind {
    /// Full administrative access.
    Admin,
    /// Elevated access without directory administration.
    SuperUser,
    /// Regular consultant account.
    Member,
}

/// Canonical user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Display name used by activity sentences and listings.
    pub name: Option<String>,
    pub verified: bool,
    pub admin: bool,
    pub kind: UserKind,
    /// Unix epoch milliseconds of account registration.
    pub registered_at: i64,
    pub role_id: Option<i64>,
    pub group_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

impl User {
    /// Human-readable label used when this user appears in feed sentences.
    ///
    /// Falls back to the email address when no display name is set.
    pub fn descriptive(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.email.clone(),
        }
    }
}

/// Fields required to insert a new user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub admin: bool,
    pub kind: UserKind,
    pub role_id: Option<i64>,
    pub group_id: Option<i64>,
}

impl NewUser {
    /// Creates a draft for a regular member account.
    pub fn member(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
            admin: false,
            kind: UserKind::Member,
            role_id: None,
            group_id: None,
        }
    }
}
