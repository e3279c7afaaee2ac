//! Core domain logic for the crewbase staffing tracker.
//! This crate is the single source of truth for business invariants.

pub mod audit;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use audit::{record_response_change, response_action, ResponseChange};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::project::{NewProject, NewProjectResponse, Project, ProjectResponse, ResponseKind};
pub use model::tag::{Tag, TagDraft, TagOwner};
pub use model::user::{NewUser, User, UserId, UserKind};
pub use repo::activity_repo::{ActivityListQuery, ActivityRepository, SqliteActivityRepository};
pub use repo::crm_repo::{CrmRepository, SqliteCrmRepository};
pub use repo::directory_repo::{DirectoryRepository, NodeEdge, SqliteDirectoryRepository};
pub use repo::experience_repo::{ExperienceRepository, SqliteExperienceRepository};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::{RepoError, RepoResult};
pub use service::directory::{DirectoryService, DirectoryServiceError};
pub use service::hierarchy::{descendant_closure, entities_under};
pub use service::profile::{ProfileService, ProfileServiceError};
pub use service::staffing::{parse_response_kind, StaffingError, StaffingService};
pub use service::tags::{TagService, TagServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
