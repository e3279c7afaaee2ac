//! Consultant profile use-case service.
//!
//! # Responsibility
//! - Validate education and work-experience input above the repository
//!   layer.
//!
//! # Invariants
//! - Profile rows only attach to existing users.
//! - When both dates are set, `ends_on` is never before `starts_on`.

use crate::model::experience::{
    Education, EducationId, NewEducation, NewWorkExperience, WorkExperience, WorkExperienceId,
};
use crate::model::user::UserId;
use crate::repo::directory_repo::DirectoryRepository;
use crate::repo::experience_repo::ExperienceRepository;
use crate::repo::{RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for profile use-cases.
#[derive(Debug)]
pub enum ProfileServiceError {
    /// Title is blank after trim.
    InvalidTitle,
    /// `ends_on` is before `starts_on`.
    InvalidDateRange { starts_on: i64, ends_on: i64 },
    /// Referenced user does not exist.
    UserNotFound(UserId),
    /// Target education does not exist.
    EducationNotFound(EducationId),
    /// Target work experience does not exist.
    WorkExperienceNotFound(WorkExperienceId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ProfileServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "title must not be blank"),
            Self::InvalidDateRange { starts_on, ends_on } => write!(
                f,
                "invalid date range: ends_on {ends_on} is before starts_on {starts_on}"
            ),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::EducationNotFound(id) => write!(f, "education not found: {id}"),
            Self::WorkExperienceNotFound(id) => {
                write!(f, "work experience not found: {id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProfileServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProfileServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "education",
                id,
            } => Self::EducationNotFound(id),
            RepoError::NotFound {
                entity: "work experience",
                id,
            } => Self::WorkExperienceNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Profile service facade over experience and directory repositories.
pub struct ProfileService<R, D>
where
    R: ExperienceRepository,
    D: DirectoryRepository,
{
    repo: R,
    directory: D,
}

impl<R, D> ProfileService<R, D>
where
    R: ExperienceRepository,
    D: DirectoryRepository,
{
    /// Creates a service using the provided repository implementations.
    pub fn new(repo: R, directory: D) -> Self {
        Self { repo, directory }
    }

    /// Creates one education entry after owner and range validation.
    pub fn create_education(
        &self,
        education: &NewEducation,
        actor: Option<UserId>,
    ) -> Result<Education, ProfileServiceError> {
        validate_title(&education.title)?;
        validate_range(education.starts_on, education.ends_on)?;
        self.ensure_user_exists(education.user_id)?;

        self.repo
            .create_education(education, actor)
            .map_err(Into::into)
    }

    pub fn get_education(&self, id: EducationId) -> RepoResult<Option<Education>> {
        self.repo.get_education(id)
    }

    pub fn list_educations(&self) -> RepoResult<Vec<Education>> {
        self.repo.list_educations()
    }

    /// Lists one consultant's education history, ordered by id.
    pub fn educations_for_user(&self, user_id: UserId) -> RepoResult<Vec<Education>> {
        self.repo.educations_by_user(user_id)
    }

    /// Updates one education entry with full replacement semantics.
    pub fn update_education(
        &self,
        education: &Education,
        actor: Option<UserId>,
    ) -> Result<Education, ProfileServiceError> {
        validate_title(&education.title)?;
        validate_range(education.starts_on, education.ends_on)?;

        self.repo
            .update_education(education, actor)
            .map_err(Into::into)
    }

    pub fn delete_education(&self, id: EducationId) -> Result<(), ProfileServiceError> {
        self.repo.delete_education(id).map_err(Into::into)
    }

    /// Creates one work-experience entry after owner and range validation.
    pub fn create_work_experience(
        &self,
        experience: &NewWorkExperience,
        actor: Option<UserId>,
    ) -> Result<WorkExperience, ProfileServiceError> {
        validate_title(&experience.title)?;
        validate_range(experience.starts_on, experience.ends_on)?;
        self.ensure_user_exists(experience.user_id)?;

        self.repo
            .create_work_experience(experience, actor)
            .map_err(Into::into)
    }

    pub fn get_work_experience(&self, id: WorkExperienceId) -> RepoResult<Option<WorkExperience>> {
        self.repo.get_work_experience(id)
    }

    pub fn list_work_experiences(&self) -> RepoResult<Vec<WorkExperience>> {
        self.repo.list_work_experiences()
    }

    /// Lists one consultant's work history, ordered by id.
    pub fn work_experiences_for_user(&self, user_id: UserId) -> RepoResult<Vec<WorkExperience>> {
        self.repo.work_experiences_by_user(user_id)
    }

    /// Updates one work-experience entry with full replacement semantics.
    pub fn update_work_experience(
        &self,
        experience: &WorkExperience,
        actor: Option<UserId>,
    ) -> Result<WorkExperience, ProfileServiceError> {
        validate_title(&experience.title)?;
        validate_range(experience.starts_on, experience.ends_on)?;

        self.repo
            .update_work_experience(experience, actor)
            .map_err(Into::into)
    }

    pub fn delete_work_experience(&self, id: WorkExperienceId) -> Result<(), ProfileServiceError> {
        self.repo.delete_work_experience(id).map_err(Into::into)
    }

    fn ensure_user_exists(&self, id: UserId) -> Result<(), ProfileServiceError> {
        self.directory
            .get_user(id)?
            .map(|_| ())
            .ok_or(ProfileServiceError::UserNotFound(id))
    }
}

fn validate_title(title: &str) -> Result<(), ProfileServiceError> {
    if title.trim().is_empty() {
        return Err(ProfileServiceError::InvalidTitle);
    }
    Ok(())
}

fn validate_range(starts_on: Option<i64>, ends_on: Option<i64>) -> Result<(), ProfileServiceError> {
    if let (Some(starts_on), Some(ends_on)) = (starts_on, ends_on) {
        if ends_on < starts_on {
            return Err(ProfileServiceError::InvalidDateRange { starts_on, ends_on });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_range, ProfileServiceError};

    #[test]
    fn open_ended_ranges_are_accepted() {
        assert!(validate_range(None, None).is_ok());
        assert!(validate_range(Some(1000), None).is_ok());
        assert!(validate_range(None, Some(1000)).is_ok());
        assert!(validate_range(Some(1000), Some(1000)).is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(
            validate_range(Some(2000), Some(1000)),
            Err(ProfileServiceError::InvalidDateRange { .. })
        ));
    }
}
