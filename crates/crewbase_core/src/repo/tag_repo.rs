//! Tag repository and owner-scoped tag synchronization.
//!
//! # Responsibility
//! - Provide CRUD APIs over `tags` storage.
//! - Own the whole-set replacement logic (`sync_tags`) with atomic
//!   semantics.
//!
//! # Invariants
//! - `sync_tags` validates every referenced tag id against the owner before
//!   performing any write; a foreign id aborts with no visible change.
//! - After a successful `sync_tags` the owner's persisted set is exactly
//!   the requested set.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::tag::{Tag, TagDraft, TagId, TagOwner, TagSuggestion};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

const TAG_SELECT_SQL: &str = "SELECT
    id,
    title,
    user_id,
    project_id,
    education_id,
    work_experience_id
FROM tags";

/// Repository interface for tag operations.
pub trait TagRepository {
    /// Replaces the owner's whole tag set in one transaction.
    ///
    /// Drafts with an id keep (and possibly retitle) an existing tag;
    /// drafts without an id create fresh tags; tags absent from the
    /// request are deleted.
    fn sync_tags(&self, owner: TagOwner, drafts: &[TagDraft]) -> RepoResult<()>;
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    /// Lists every tag, ordered by id.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    /// Lists the owner's tags, ordered by id.
    fn tags_for_owner(&self, owner: TagOwner) -> RepoResult<Vec<Tag>>;
    fn retitle_tag(&self, id: TagId, title: &str) -> RepoResult<Tag>;
    fn delete_tag(&self, id: TagId) -> RepoResult<()>;
    /// Aggregates distinct titles with usage counts for typeahead.
    fn tag_suggestions(&self) -> RepoResult<Vec<TagSuggestion>>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &["tags", "users", "projects", "educations", "work_experiences"],
        )?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn sync_tags(&self, owner: TagOwner, drafts: &[TagDraft]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        if !owner_exists_in_tx(&tx, owner)? {
            return Err(RepoError::NotFound {
                entity: owner_entity(owner),
                id: owner.id(),
            });
        }

        let current = load_owned_tag_ids(&tx, owner)?;

        // Validate the whole request before touching any row.
        for draft in drafts {
            if let Some(tag_id) = draft.id {
                if !current.contains(&tag_id) {
                    return Err(RepoError::ForeignTag { tag_id });
                }
            }
        }

        let mut requested: BTreeSet<TagId> = BTreeSet::new();
        for draft in drafts {
            match draft.id {
                Some(tag_id) => {
                    tx.execute(
                        "UPDATE tags SET title = ?2 WHERE id = ?1;",
                        params![tag_id, draft.title.as_str()],
                    )?;
                    requested.insert(tag_id);
                }
                None => {
                    tx.execute(
                        &format!(
                            "INSERT INTO tags (title, {}) VALUES (?1, ?2);",
                            owner_column(owner)
                        ),
                        params![draft.title.as_str(), owner.id()],
                    )?;
                    requested.insert(tx.last_insert_rowid());
                }
            }
        }

        let stale: Vec<TagId> = current.difference(&requested).copied().collect();
        if !stale.is_empty() {
            let placeholders = vec!["?"; stale.len()].join(", ");
            tx.execute(
                &format!("DELETE FROM tags WHERE id IN ({placeholders});"),
                params_from_iter(stale.iter().copied()),
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TAG_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_tag_row(row)?));
        }
        Ok(None)
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TAG_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn tags_for_owner(&self, owner: TagOwner) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TAG_SELECT_SQL} WHERE {} = ?1 ORDER BY id ASC;",
            owner_column(owner)
        ))?;
        let mut rows = stmt.query([owner.id()])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn retitle_tag(&self, id: TagId, title: &str) -> RepoResult<Tag> {
        let changed = self.conn.execute(
            "UPDATE tags SET title = ?2 WHERE id = ?1;",
            params![id, title],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "tag", id });
        }

        match self.get_tag(id)? {
            Some(tag) => Ok(tag),
            None => Err(RepoError::NotFound { entity: "tag", id }),
        }
    }

    fn delete_tag(&self, id: TagId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM tags WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "tag", id });
        }
        Ok(())
    }

    fn tag_suggestions(&self) -> RepoResult<Vec<TagSuggestion>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, COUNT(*) AS uses
             FROM tags
             GROUP BY title
             ORDER BY uses DESC, title ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut suggestions = Vec::new();
        while let Some(row) = rows.next()? {
            suggestions.push(TagSuggestion {
                title: row.get("title")?,
                count: row.get("uses")?,
            });
        }
        Ok(suggestions)
    }
}

fn owner_column(owner: TagOwner) -> &'static str {
    match owner {
        TagOwner::User(_) => "user_id",
        TagOwner::Project(_) => "project_id",
        TagOwner::Education(_) => "education_id",
        TagOwner::WorkExperience(_) => "work_experience_id",
    }
}

fn owner_table(owner: TagOwner) -> &'static str {
    match owner {
        TagOwner::User(_) => "users",
        TagOwner::Project(_) => "projects",
        TagOwner::Education(_) => "educations",
        TagOwner::WorkExperience(_) => "work_experiences",
    }
}

fn owner_entity(owner: TagOwner) -> &'static str {
    match owner {
        TagOwner::User(_) => "user",
        TagOwner::Project(_) => "project",
        TagOwner::Education(_) => "education",
        TagOwner::WorkExperience(_) => "work experience",
    }
}

fn owner_exists_in_tx(tx: &Transaction<'_>, owner: TagOwner) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);",
            owner_table(owner)
        ),
        [owner.id()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn load_owned_tag_ids(tx: &Transaction<'_>, owner: TagOwner) -> RepoResult<BTreeSet<TagId>> {
    let mut stmt = tx.prepare(&format!(
        "SELECT id FROM tags WHERE {} = ?1;",
        owner_column(owner)
    ))?;
    let mut rows = stmt.query([owner.id()])?;
    let mut ids = BTreeSet::new();
    while let Some(row) = rows.next()? {
        ids.insert(row.get(0)?);
    }
    Ok(ids)
}

fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let id: TagId = row.get("id")?;
    let owner = match (
        row.get::<_, Option<i64>>("user_id")?,
        row.get::<_, Option<i64>>("project_id")?,
        row.get::<_, Option<i64>>("education_id")?,
        row.get::<_, Option<i64>>("work_experience_id")?,
    ) {
        (Some(user_id), None, None, None) => TagOwner::User(user_id),
        (None, Some(project_id), None, None) => TagOwner::Project(project_id),
        (None, None, Some(education_id), None) => TagOwner::Education(education_id),
        (None, None, None, Some(work_experience_id)) => {
            TagOwner::WorkExperience(work_experience_id)
        }
        _ => {
            return Err(RepoError::InvalidData(format!(
                "tag {id} must reference exactly one owner"
            )));
        }
    };

    Ok(Tag {
        id,
        title: row.get("title")?,
        owner,
    })
}
