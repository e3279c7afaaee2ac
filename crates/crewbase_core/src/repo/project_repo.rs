//! Project and staffing response repository.
//!
//! # Responsibility
//! - Provide CRUD APIs over `projects` and `project_responses` storage.
//! - Run response writes and their feed recording in one transaction.
//!
//! # Invariants
//! - `create_response`/`update_response` never commit a response row without
//!   also committing the feed entry that change warrants.
//! - Response updates only touch `price` and `kind`; ownership columns are
//!   fixed at creation and only reset by FK policy.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::audit::{record_response_change, ResponseChange};
use crate::model::project::{
    NewProject, NewProjectResponse, Project, ProjectId, ProjectResponse, ProjectResponseId,
    ResponseKind,
};
use crate::model::user::UserId;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    starts_on,
    ends_on,
    hours,
    customer_id,
    location_id,
    created_at,
    updated_at,
    created_by,
    updated_by
FROM projects";

const RESPONSE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    project_id,
    price,
    kind,
    created_at,
    updated_at,
    created_by,
    updated_by
FROM project_responses";

/// Repository interface for projects and staffing responses.
pub trait ProjectRepository {
    fn create_project(&self, project: &NewProject, actor: Option<UserId>) -> RepoResult<Project>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    /// Lists the projects attached to one customer, ordered by id.
    fn projects_by_customer(&self, customer_id: i64) -> RepoResult<Vec<Project>>;
    fn update_project(&self, project: &Project, actor: Option<UserId>) -> RepoResult<Project>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;

    /// Creates one response and records its feed entry atomically.
    fn create_response(
        &self,
        response: &NewProjectResponse,
        actor: Option<UserId>,
    ) -> RepoResult<ProjectResponse>;
    fn get_response(&self, id: ProjectResponseId) -> RepoResult<Option<ProjectResponse>>;
    fn list_responses(&self) -> RepoResult<Vec<ProjectResponse>>;
    /// Lists responses targeting one project, ordered by id.
    fn responses_by_project(&self, project_id: ProjectId) -> RepoResult<Vec<ProjectResponse>>;
    /// Lists responses made by one user, ordered by id.
    fn responses_by_user(&self, user_id: UserId) -> RepoResult<Vec<ProjectResponse>>;
    /// Updates price/kind and records the feed entry atomically.
    fn update_response(
        &self,
        id: ProjectResponseId,
        price: i64,
        kind: ResponseKind,
        actor: Option<UserId>,
    ) -> RepoResult<ProjectResponse>;
    fn delete_response(&self, id: ProjectResponseId) -> RepoResult<()>;
}

/// SQLite-backed project/staffing repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["projects", "project_responses", "activities"])?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &NewProject, actor: Option<UserId>) -> RepoResult<Project> {
        self.conn.execute(
            "INSERT INTO projects (
                title,
                description,
                starts_on,
                ends_on,
                hours,
                customer_id,
                location_id,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                project.title.as_str(),
                project.description.as_str(),
                project.starts_on,
                project.ends_on,
                project.hours,
                project.customer_id,
                project.location_id,
                actor,
                actor,
            ],
        )?;

        load_required_project(self.conn, self.conn.last_insert_rowid())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn projects_by_customer(&self, customer_id: i64) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} WHERE customer_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([customer_id])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn update_project(&self, project: &Project, actor: Option<UserId>) -> RepoResult<Project> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                title = ?2,
                description = ?3,
                starts_on = ?4,
                ends_on = ?5,
                hours = ?6,
                customer_id = ?7,
                location_id = ?8,
                updated_at = (strftime('%s', 'now') * 1000),
                updated_by = ?9
             WHERE id = ?1;",
            params![
                project.id,
                project.title.as_str(),
                project.description.as_str(),
                project.starts_on,
                project.ends_on,
                project.hours,
                project.customer_id,
                project.location_id,
                actor,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id: project.id,
            });
        }

        load_required_project(self.conn, project.id)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }

    fn create_response(
        &self,
        response: &NewProjectResponse,
        actor: Option<UserId>,
    ) -> RepoResult<ProjectResponse> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO project_responses (
                user_id,
                project_id,
                price,
                kind,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                response.user_id,
                response.project_id,
                response.price,
                response_kind_to_db(response.kind),
                actor,
                actor,
            ],
        )?;
        let response_id = tx.last_insert_rowid();

        record_response_change(
            &tx,
            &ResponseChange {
                response_id,
                user_id: Some(response.user_id),
                project_id: Some(response.project_id),
                kind: response.kind,
                previous_kind: None,
                is_new: true,
            },
        )?;

        tx.commit()?;
        load_required_response(self.conn, response_id)
    }

    fn get_response(&self, id: ProjectResponseId) -> RepoResult<Option<ProjectResponse>> {
        load_response(self.conn, id)
    }

    fn list_responses(&self) -> RepoResult<Vec<ProjectResponse>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESPONSE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut responses = Vec::new();
        while let Some(row) = rows.next()? {
            responses.push(parse_response_row(row)?);
        }
        Ok(responses)
    }

    fn responses_by_project(&self, project_id: ProjectId) -> RepoResult<Vec<ProjectResponse>> {
        load_responses_by_fk(self.conn, "project_id", project_id)
    }

    fn responses_by_user(&self, user_id: UserId) -> RepoResult<Vec<ProjectResponse>> {
        load_responses_by_fk(self.conn, "user_id", user_id)
    }

    fn update_response(
        &self,
        id: ProjectResponseId,
        price: i64,
        kind: ResponseKind,
        actor: Option<UserId>,
    ) -> RepoResult<ProjectResponse> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let previous = match load_response(&tx, id)? {
            Some(response) => response,
            None => {
                return Err(RepoError::NotFound {
                    entity: "project response",
                    id,
                });
            }
        };

        tx.execute(
            "UPDATE project_responses
             SET
                price = ?2,
                kind = ?3,
                updated_at = (strftime('%s', 'now') * 1000),
                updated_by = ?4
             WHERE id = ?1;",
            params![id, price, response_kind_to_db(kind), actor],
        )?;

        record_response_change(
            &tx,
            &ResponseChange {
                response_id: id,
                user_id: previous.user_id,
                project_id: previous.project_id,
                kind,
                previous_kind: Some(previous.kind),
                is_new: false,
            },
        )?;

        tx.commit()?;
        load_required_response(self.conn, id)
    }

    fn delete_response(&self, id: ProjectResponseId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM project_responses WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project response",
                id,
            });
        }
        Ok(())
    }
}

fn load_required_project(conn: &Connection, id: ProjectId) -> RepoResult<Project> {
    let mut stmt = conn.prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_project_row(row);
    }
    Err(RepoError::NotFound {
        entity: "project",
        id,
    })
}

fn load_response(conn: &Connection, id: ProjectResponseId) -> RepoResult<Option<ProjectResponse>> {
    let mut stmt = conn.prepare(&format!("{RESPONSE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_response_row(row)?));
    }
    Ok(None)
}

fn load_required_response(conn: &Connection, id: ProjectResponseId) -> RepoResult<ProjectResponse> {
    match load_response(conn, id)? {
        Some(response) => Ok(response),
        None => Err(RepoError::NotFound {
            entity: "project response",
            id,
        }),
    }
}

fn load_responses_by_fk(
    conn: &Connection,
    column: &str,
    id: i64,
) -> RepoResult<Vec<ProjectResponse>> {
    let mut stmt = conn.prepare(&format!(
        "{RESPONSE_SELECT_SQL} WHERE {column} = ?1 ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([id])?;
    let mut responses = Vec::new();
    while let Some(row) = rows.next()? {
        responses.push(parse_response_row(row)?);
    }
    Ok(responses)
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    Ok(Project {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        starts_on: row.get("starts_on")?,
        ends_on: row.get("ends_on")?,
        hours: row.get("hours")?,
        customer_id: row.get("customer_id")?,
        location_id: row.get("location_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    })
}

fn parse_response_row(row: &Row<'_>) -> RepoResult<ProjectResponse> {
    let kind_text: String = row.get("kind")?;
    let kind = parse_response_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid kind value `{kind_text}` in project_responses.kind"
        ))
    })?;

    Ok(ProjectResponse {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        project_id: row.get("project_id")?,
        price: row.get("price")?,
        kind,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    })
}

fn response_kind_to_db(kind: ResponseKind) -> &'static str {
    match kind {
        ResponseKind::Empty => "EMPTY",
        ResponseKind::Interested => "INTERESTED",
        ResponseKind::Proposed => "PROPOSED",
        ResponseKind::Accepted => "ACCEPTED",
        ResponseKind::Rejected => "REJECTED",
    }
}

fn parse_response_kind(value: &str) -> Option<ResponseKind> {
    match value {
        "EMPTY" => Some(ResponseKind::Empty),
        "INTERESTED" => Some(ResponseKind::Interested),
        "PROPOSED" => Some(ResponseKind::Proposed),
        "ACCEPTED" => Some(ResponseKind::Accepted),
        "REJECTED" => Some(ResponseKind::Rejected),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_response_kind, response_kind_to_db};
    use crate::model::project::ResponseKind;

    #[test]
    fn response_kind_codec_round_trips() {
        for kind in [
            ResponseKind::Empty,
            ResponseKind::Interested,
            ResponseKind::Proposed,
            ResponseKind::Accepted,
            ResponseKind::Rejected,
        ] {
            assert_eq!(parse_response_kind(response_kind_to_db(kind)), Some(kind));
        }
    }

    #[test]
    fn unknown_response_kind_is_rejected() {
        assert_eq!(parse_response_kind("MAYBE"), None);
        assert_eq!(parse_response_kind("interested"), None);
    }
}
