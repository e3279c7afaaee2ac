//! Consultant profile history: educations and work experiences.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

pub type EducationId = i64;
pub type WorkExperienceId = i64;

/// Classification of an education entry.
///
/// Stored as a TEXT column; the repository owns the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationKind {
    /// Formal degree education.
    Education,
    /// External course or certification.
    Course,
    /// Course held inside the consultancy.
    InternalCourse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub id: EducationId,
    pub title: String,
    pub school: String,
    pub extent: String,
    pub description: String,
    pub kind: EducationKind,
    /// Unix epoch milliseconds. Should be <= `ends_on` when both are set.
    pub starts_on: Option<i64>,
    pub ends_on: Option<i64>,
    /// Pinned to the top of the consultant's profile when set.
    pub highlight: bool,
    pub user_id: UserId,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub id: WorkExperienceId,
    pub title: String,
    pub employer: String,
    pub description: String,
    pub starts_on: Option<i64>,
    pub ends_on: Option<i64>,
    pub highlight: bool,
    pub user_id: UserId,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

/// Fields required to insert a new education row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEducation {
    pub title: String,
    pub school: String,
    pub extent: String,
    pub description: String,
    pub kind: EducationKind,
    pub starts_on: Option<i64>,
    pub ends_on: Option<i64>,
    pub highlight: bool,
    pub user_id: UserId,
}

impl NewEducation {
    /// Creates a degree-education draft with only title and owner set.
    pub fn degree(user_id: UserId, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            school: String::new(),
            extent: String::new(),
            description: String::new(),
            kind: EducationKind::Education,
            starts_on: None,
            ends_on: None,
            highlight: false,
            user_id,
        }
    }
}

/// Fields required to insert a new work experience row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkExperience {
    pub title: String,
    pub employer: String,
    pub description: String,
    pub starts_on: Option<i64>,
    pub ends_on: Option<i64>,
    pub highlight: bool,
    pub user_id: UserId,
}
