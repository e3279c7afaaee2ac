//! Tag domain model.
//!
//! # Responsibility
//! - Define free-form skill/keyword labels and their single owner.
//!
//! # Invariants
//! - Every tag belongs to exactly one owning record; ownership never moves
//!   between records after creation.
//! - Titles are stored as entered (trimmed); duplicates across and within
//!   owners are allowed.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::experience::{EducationId, WorkExperienceId};
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

pub type TagId = i64;

/// The record a tag is attached to.
///
/// Maps one-to-one onto the four nullable owner columns of the `tags`
/// table; constructing this enum is what guarantees exactly one is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagOwner {
    User(UserId),
    Project(ProjectId),
    Education(EducationId),
    WorkExperience(WorkExperienceId),
}

impl TagOwner {
    /// Id of the owning record, regardless of owner table.
    pub fn id(&self) -> i64 {
        match self {
            Self::User(id) | Self::Project(id) | Self::Education(id) | Self::WorkExperience(id) => {
                *id
            }
        }
    }
}

/// Persisted tag label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub title: String,
    pub owner: TagOwner,
}

/// One requested tag in a synchronization call.
///
/// An `id` of `None` asks for a fresh tag; a present `id` must reference a
/// tag already owned by the target record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDraft {
    pub id: Option<TagId>,
    pub title: String,
}

impl TagDraft {
    /// Draft for a brand new tag.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
        }
    }

    /// Draft keeping (or retitling) an existing tag.
    pub fn existing(id: TagId, title: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            title: title.into(),
        }
    }
}

/// Aggregated tag title with its usage count, for typeahead suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSuggestion {
    pub title: String,
    pub count: i64,
}
