//! Tag use-case service.
//!
//! # Responsibility
//! - Validate requested tag drafts before handing them to the synchronizer.
//! - Read back the final tag set so callers see assigned ids.
//!
//! # Invariants
//! - Titles are trimmed; blank titles never reach storage.
//! - Duplicate titles are allowed; tags are labels, not normalized keywords.

use crate::model::tag::{Tag, TagDraft, TagId, TagOwner, TagSuggestion};
use crate::repo::tag_repo::TagRepository;
use crate::repo::{RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for tag use-cases.
#[derive(Debug)]
pub enum TagServiceError {
    /// A requested title is empty after trimming.
    BlankTitle,
    /// The record the tags should attach to does not exist.
    OwnerNotFound(TagOwner),
    /// A requested tag id is not owned by the target record.
    ForeignTag(TagId),
    /// Target tag does not exist.
    TagNotFound(TagId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TagServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "tag title must not be blank"),
            Self::OwnerNotFound(owner) => write!(f, "tag owner not found: {owner:?}"),
            Self::ForeignTag(tag_id) => {
                write!(f, "tag {tag_id} is not owned by the target record")
            }
            Self::TagNotFound(tag_id) => write!(f, "tag not found: {tag_id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TagServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TagServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ForeignTag { tag_id } => Self::ForeignTag(tag_id),
            RepoError::NotFound { entity: "tag", id } => Self::TagNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Tag service facade over a repository implementation.
pub struct TagService<R: TagRepository> {
    repo: R,
}

impl<R: TagRepository> TagService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Replaces the owner's whole tag set and returns the resulting tags.
    ///
    /// After a successful call the owner's persisted tags are exactly the
    /// requested set; fresh titles come back with their assigned ids. A
    /// draft referencing a tag the owner does not hold aborts the whole
    /// call with no visible change.
    pub fn set_tags(
        &self,
        owner: TagOwner,
        drafts: Vec<TagDraft>,
    ) -> Result<Vec<Tag>, TagServiceError> {
        let mut trimmed = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let title = draft.title.trim();
            if title.is_empty() {
                return Err(TagServiceError::BlankTitle);
            }
            trimmed.push(TagDraft {
                id: draft.id,
                title: title.to_string(),
            });
        }

        match self.repo.sync_tags(owner, &trimmed) {
            Ok(()) => {}
            Err(RepoError::NotFound { .. }) => {
                return Err(TagServiceError::OwnerNotFound(owner));
            }
            Err(other) => return Err(other.into()),
        }

        self.repo.tags_for_owner(owner).map_err(Into::into)
    }

    pub fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        self.repo.get_tag(id)
    }

    pub fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        self.repo.list_tags()
    }

    /// Lists the owner's tags, ordered by id.
    pub fn tags_for_owner(&self, owner: TagOwner) -> RepoResult<Vec<Tag>> {
        self.repo.tags_for_owner(owner)
    }

    /// Renames one tag in place.
    pub fn retitle_tag(&self, id: TagId, title: &str) -> Result<Tag, TagServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TagServiceError::BlankTitle);
        }
        self.repo.retitle_tag(id, title).map_err(Into::into)
    }

    pub fn delete_tag(&self, id: TagId) -> Result<(), TagServiceError> {
        self.repo.delete_tag(id).map_err(Into::into)
    }

    /// Aggregates distinct titles with usage counts for typeahead.
    pub fn tag_suggestions(&self) -> RepoResult<Vec<TagSuggestion>> {
        self.repo.tag_suggestions()
    }
}
