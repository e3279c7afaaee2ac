//! Activity feed model.
//!
//! # Responsibility
//! - Define the append-only feed entry describing a notable staffing event.
//!
//! # Invariants
//! - Rows are written once and never updated; deletion only happens via
//!   whole-database cleanup, not through core APIs.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::crm::CustomerId;
use crate::model::experience::{EducationId, WorkExperienceId};
use crate::model::project::{ProjectId, ProjectResponseId};
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

pub type ActivityId = i64;

/// One feed entry, e.g. `Jane Doe is interested in the project Cool Project`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    /// Fully rendered, human-readable sentence.
    pub action: String,
    pub user_id: Option<UserId>,
    pub project_response_id: Option<ProjectResponseId>,
    pub project_id: Option<ProjectId>,
    pub education_id: Option<EducationId>,
    pub work_experience_id: Option<WorkExperienceId>,
    pub customer_id: Option<CustomerId>,
    pub created_at: i64,
}

/// Fields for appending a feed entry; unrelated references stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    pub action: String,
    pub user_id: Option<UserId>,
    pub project_response_id: Option<ProjectResponseId>,
    pub project_id: Option<ProjectId>,
    pub education_id: Option<EducationId>,
    pub work_experience_id: Option<WorkExperienceId>,
    pub customer_id: Option<CustomerId>,
}
