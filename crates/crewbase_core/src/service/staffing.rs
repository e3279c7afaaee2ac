//! Staffing use-case service.
//!
//! # Responsibility
//! - Validate project references (customer, location) and response
//!   references (user, project) above the repository layer.
//! - Delegate response writes to the composite repository operations that
//!   record feed entries in the same transaction.
//!
//! # Invariants
//! - A response is never created against a missing user or project.
//! - Feed recording is the repository's concern; this layer never writes
//!   activities directly.

use crate::model::project::{
    NewProject, NewProjectResponse, Project, ProjectId, ProjectResponse, ProjectResponseId,
    ResponseKind,
};
use crate::model::user::UserId;
use crate::repo::crm_repo::CrmRepository;
use crate::repo::directory_repo::DirectoryRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::{RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for staffing use-cases.
#[derive(Debug)]
pub enum StaffingError {
    /// Project title is blank after trim.
    InvalidTitle,
    /// Response kind string from the request is not recognized.
    InvalidKind(String),
    /// Referenced user does not exist.
    UserNotFound(UserId),
    /// Referenced project does not exist.
    ProjectNotFound(ProjectId),
    /// Referenced customer does not exist.
    CustomerNotFound(i64),
    /// Referenced location does not exist.
    LocationNotFound(i64),
    /// Target response does not exist.
    ResponseNotFound(ProjectResponseId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for StaffingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "project title must not be blank"),
            Self::InvalidKind(value) => write!(f, "unknown response kind: `{value}`"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::CustomerNotFound(id) => write!(f, "customer not found: {id}"),
            Self::LocationNotFound(id) => write!(f, "location not found: {id}"),
            Self::ResponseNotFound(id) => write!(f, "project response not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StaffingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StaffingError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "project",
                id,
            } => Self::ProjectNotFound(id),
            RepoError::NotFound {
                entity: "project response",
                id,
            } => Self::ResponseNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Parses a response kind from request input, case-insensitively.
pub fn parse_response_kind(value: &str) -> Result<ResponseKind, StaffingError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "EMPTY" => Ok(ResponseKind::Empty),
        "INTERESTED" => Ok(ResponseKind::Interested),
        "PROPOSED" => Ok(ResponseKind::Proposed),
        "ACCEPTED" => Ok(ResponseKind::Accepted),
        "REJECTED" => Ok(ResponseKind::Rejected),
        _ => Err(StaffingError::InvalidKind(value.to_string())),
    }
}

/// Staffing service facade over project, directory and CRM repositories.
pub struct StaffingService<P, D, C>
where
    P: ProjectRepository,
    D: DirectoryRepository,
    C: CrmRepository,
{
    projects: P,
    directory: D,
    crm: C,
}

impl<P, D, C> StaffingService<P, D, C>
where
    P: ProjectRepository,
    D: DirectoryRepository,
    C: CrmRepository,
{
    /// Creates a service using the provided repository implementations.
    pub fn new(projects: P, directory: D, crm: C) -> Self {
        Self {
            projects,
            directory,
            crm,
        }
    }

    /// Creates one project after reference validation.
    pub fn create_project(
        &self,
        project: &NewProject,
        actor: Option<UserId>,
    ) -> Result<Project, StaffingError> {
        if project.title.trim().is_empty() {
            return Err(StaffingError::InvalidTitle);
        }
        self.ensure_project_refs(project.customer_id, project.location_id)?;

        self.projects
            .create_project(project, actor)
            .map_err(Into::into)
    }

    pub fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        self.projects.get_project(id)
    }

    pub fn list_projects(&self) -> RepoResult<Vec<Project>> {
        self.projects.list_projects()
    }

    /// Updates one project with full replacement semantics.
    pub fn update_project(
        &self,
        project: &Project,
        actor: Option<UserId>,
    ) -> Result<Project, StaffingError> {
        if project.title.trim().is_empty() {
            return Err(StaffingError::InvalidTitle);
        }
        self.ensure_project_refs(project.customer_id, project.location_id)?;

        self.projects
            .update_project(project, actor)
            .map_err(Into::into)
    }

    pub fn delete_project(&self, id: ProjectId) -> Result<(), StaffingError> {
        self.projects.delete_project(id).map_err(Into::into)
    }

    /// Records one consultant's stance on a project.
    ///
    /// The repository writes the response row and its feed entry in one
    /// transaction, so a loggable kind is never persisted without its
    /// activity.
    pub fn respond(
        &self,
        response: &NewProjectResponse,
        actor: Option<UserId>,
    ) -> Result<ProjectResponse, StaffingError> {
        if self.directory.get_user(response.user_id)?.is_none() {
            return Err(StaffingError::UserNotFound(response.user_id));
        }
        if self.projects.get_project(response.project_id)?.is_none() {
            return Err(StaffingError::ProjectNotFound(response.project_id));
        }

        self.projects
            .create_response(response, actor)
            .map_err(Into::into)
    }

    pub fn get_response(&self, id: ProjectResponseId) -> RepoResult<Option<ProjectResponse>> {
        self.projects.get_response(id)
    }

    /// Lists responses targeting one project, ordered by id.
    pub fn responses_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<ProjectResponse>> {
        self.projects.responses_by_project(project_id)
    }

    /// Lists responses made by one user, ordered by id.
    pub fn responses_for_user(&self, user_id: UserId) -> RepoResult<Vec<ProjectResponse>> {
        self.projects.responses_by_user(user_id)
    }

    /// Updates a response's price and kind.
    pub fn update_response(
        &self,
        id: ProjectResponseId,
        price: i64,
        kind: ResponseKind,
        actor: Option<UserId>,
    ) -> Result<ProjectResponse, StaffingError> {
        self.projects
            .update_response(id, price, kind, actor)
            .map_err(Into::into)
    }

    pub fn delete_response(&self, id: ProjectResponseId) -> Result<(), StaffingError> {
        self.projects.delete_response(id).map_err(Into::into)
    }

    fn ensure_project_refs(
        &self,
        customer_id: Option<i64>,
        location_id: Option<i64>,
    ) -> Result<(), StaffingError> {
        if let Some(customer_id) = customer_id {
            if self.crm.get_customer(customer_id)?.is_none() {
                return Err(StaffingError::CustomerNotFound(customer_id));
            }
        }
        if let Some(location_id) = location_id {
            if self.crm.get_location(location_id)?.is_none() {
                return Err(StaffingError::LocationNotFound(location_id));
            }
        }
        Ok(())
    }
}
