//! Directory use-case service.
//!
//! # Responsibility
//! - Validate user input (email shape, referenced directory nodes) above
//!   the repository layer.
//! - Expose the hierarchy queries: descendant roles/groups and the users
//!   staffed anywhere under a node.
//!
//! # Invariants
//! - A user is never created with an email another account already holds.
//! - Role/group assignments only reference existing nodes.

use crate::model::org::{Group, GroupId, NewGroup, NewRole, Role, RoleId};
use crate::model::user::{NewUser, User, UserId};
use crate::repo::directory_repo::DirectoryRepository;
use crate::repo::{RepoError, RepoResult};
use crate::service::hierarchy::descendant_closure;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Service error for directory use-cases.
#[derive(Debug)]
pub enum DirectoryServiceError {
    /// Email fails the basic shape check.
    InvalidEmail(String),
    /// Another account already uses this email.
    EmailTaken(String),
    /// Target user does not exist.
    UserNotFound(UserId),
    /// Referenced role does not exist.
    RoleNotFound(RoleId),
    /// Referenced group does not exist.
    GroupNotFound(GroupId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for DirectoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(email) => write!(f, "invalid email: `{email}`"),
            Self::EmailTaken(email) => write!(f, "email already registered: `{email}`"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::RoleNotFound(id) => write!(f, "role not found: {id}"),
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DirectoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DirectoryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "user", id } => Self::UserNotFound(id),
            RepoError::NotFound { entity: "role", id } => Self::RoleNotFound(id),
            RepoError::NotFound {
                entity: "group",
                id,
            } => Self::GroupNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Directory service facade over a repository implementation.
pub struct DirectoryService<R: DirectoryRepository> {
    repo: R,
}

impl<R: DirectoryRepository> DirectoryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one user after email and node-reference validation.
    pub fn create_user(
        &self,
        user: &NewUser,
        actor: Option<UserId>,
    ) -> Result<User, DirectoryServiceError> {
        self.validate_email(&user.email)?;
        if self.repo.get_user_by_email(&user.email)?.is_some() {
            return Err(DirectoryServiceError::EmailTaken(user.email.clone()));
        }
        self.ensure_nodes_exist(user.role_id, user.group_id)?;

        self.repo.create_user(user, actor).map_err(Into::into)
    }

    pub fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.repo.get_user(id)
    }

    pub fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.repo.get_user_by_email(email)
    }

    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        self.repo.list_users()
    }

    /// Updates one user with full replacement semantics.
    pub fn update_user(
        &self,
        user: &User,
        actor: Option<UserId>,
    ) -> Result<User, DirectoryServiceError> {
        self.validate_email(&user.email)?;
        if let Some(existing) = self.repo.get_user_by_email(&user.email)? {
            if existing.id != user.id {
                return Err(DirectoryServiceError::EmailTaken(user.email.clone()));
            }
        }
        self.ensure_nodes_exist(user.role_id, user.group_id)?;

        self.repo.update_user(user, actor).map_err(Into::into)
    }

    /// Marks one account as verified.
    pub fn verify_user(
        &self,
        id: UserId,
        actor: Option<UserId>,
    ) -> Result<User, DirectoryServiceError> {
        self.repo
            .set_user_verified(id, true, actor)
            .map_err(Into::into)
    }

    pub fn delete_user(&self, id: UserId) -> Result<(), DirectoryServiceError> {
        self.repo.delete_user(id).map_err(Into::into)
    }

    /// Creates one role under an optional existing parent.
    pub fn create_role(
        &self,
        role: &NewRole,
        actor: Option<UserId>,
    ) -> Result<Role, DirectoryServiceError> {
        if let Some(parent_id) = role.parent_role_id {
            self.ensure_role_exists(parent_id)?;
        }
        self.repo.create_role(role, actor).map_err(Into::into)
    }

    pub fn get_role(&self, id: RoleId) -> RepoResult<Option<Role>> {
        self.repo.get_role(id)
    }

    pub fn list_roles(&self) -> RepoResult<Vec<Role>> {
        self.repo.list_roles()
    }

    /// Renames and/or re-parents one role.
    pub fn update_role(
        &self,
        role: &Role,
        actor: Option<UserId>,
    ) -> Result<Role, DirectoryServiceError> {
        if let Some(parent_id) = role.parent_role_id {
            self.ensure_role_exists(parent_id)?;
        }
        self.repo.update_role(role, actor).map_err(Into::into)
    }

    pub fn delete_role(&self, id: RoleId) -> Result<(), DirectoryServiceError> {
        self.repo.delete_role(id).map_err(Into::into)
    }

    /// Creates one group under an optional existing parent.
    pub fn create_group(
        &self,
        group: &NewGroup,
        actor: Option<UserId>,
    ) -> Result<Group, DirectoryServiceError> {
        if let Some(parent_id) = group.parent_group_id {
            self.ensure_group_exists(parent_id)?;
        }
        self.repo.create_group(group, actor).map_err(Into::into)
    }

    pub fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>> {
        self.repo.get_group(id)
    }

    pub fn list_groups(&self) -> RepoResult<Vec<Group>> {
        self.repo.list_groups()
    }

    /// Renames and/or re-parents one group.
    pub fn update_group(
        &self,
        group: &Group,
        actor: Option<UserId>,
    ) -> Result<Group, DirectoryServiceError> {
        if let Some(parent_id) = group.parent_group_id {
            self.ensure_group_exists(parent_id)?;
        }
        self.repo.update_group(group, actor).map_err(Into::into)
    }

    pub fn delete_group(&self, id: GroupId) -> Result<(), DirectoryServiceError> {
        self.repo.delete_group(id).map_err(Into::into)
    }

    /// Returns the role itself plus every role transitively below it.
    pub fn role_descendants(&self, role_id: RoleId) -> RepoResult<Vec<Role>> {
        let edges = self.repo.role_edges()?;
        let closure: HashSet<i64> = descendant_closure(&edges, role_id).into_iter().collect();
        let roles = self
            .repo
            .list_roles()?
            .into_iter()
            .filter(|role| closure.contains(&role.id))
            .collect();
        Ok(roles)
    }

    /// Returns the group itself plus every group transitively below it.
    pub fn group_descendants(&self, group_id: GroupId) -> RepoResult<Vec<Group>> {
        let edges = self.repo.group_edges()?;
        let closure: HashSet<i64> = descendant_closure(&edges, group_id).into_iter().collect();
        let groups = self
            .repo
            .list_groups()?
            .into_iter()
            .filter(|group| closure.contains(&group.id))
            .collect();
        Ok(groups)
    }

    /// Lists every user whose role sits anywhere under the given role.
    pub fn users_under_role(&self, role_id: RoleId) -> RepoResult<Vec<User>> {
        let edges = self.repo.role_edges()?;
        let closure = descendant_closure(&edges, role_id);
        if closure.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.users_by_role_ids(&closure)
    }

    /// Lists every user whose group sits anywhere under the given group.
    pub fn users_under_group(&self, group_id: GroupId) -> RepoResult<Vec<User>> {
        let edges = self.repo.group_edges()?;
        let closure = descendant_closure(&edges, group_id);
        if closure.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.users_by_group_ids(&closure)
    }

    fn validate_email(&self, email: &str) -> Result<(), DirectoryServiceError> {
        if EMAIL_RE.is_match(email) {
            Ok(())
        } else {
            Err(DirectoryServiceError::InvalidEmail(email.to_string()))
        }
    }

    fn ensure_nodes_exist(
        &self,
        role_id: Option<RoleId>,
        group_id: Option<GroupId>,
    ) -> Result<(), DirectoryServiceError> {
        if let Some(role_id) = role_id {
            self.ensure_role_exists(role_id)?;
        }
        if let Some(group_id) = group_id {
            self.ensure_group_exists(group_id)?;
        }
        Ok(())
    }

    fn ensure_role_exists(&self, id: RoleId) -> Result<(), DirectoryServiceError> {
        self.repo
            .get_role(id)?
            .map(|_| ())
            .ok_or(DirectoryServiceError::RoleNotFound(id))
    }

    fn ensure_group_exists(&self, id: GroupId) -> Result<(), DirectoryServiceError> {
        self.repo
            .get_group(id)?
            .map(|_| ())
            .ok_or(DirectoryServiceError::GroupNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::EMAIL_RE;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(EMAIL_RE.is_match("jane.doe@firm.se"));
        assert!(EMAIL_RE.is_match("a@b.co"));
    }

    #[test]
    fn email_regex_rejects_obvious_garbage() {
        assert!(!EMAIL_RE.is_match("not-an-email"));
        assert!(!EMAIL_RE.is_match("two@@ats.se"));
        assert!(!EMAIL_RE.is_match("spaces in@mail.se"));
        assert!(!EMAIL_RE.is_match("no-tld@host"));
    }
}
