//! Activity feed repository.
//!
//! # Invariants
//! - The feed is append-only; no update or delete API exists.
//! - Listing is newest first with id as the tie breaker.

use crate::model::activity::{Activity, ActivityId, NewActivity};
use crate::repo::{ensure_connection_ready, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ACTIVITY_SELECT_SQL: &str = "SELECT
    id,
    action,
    user_id,
    project_response_id,
    project_id,
    education_id,
    work_experience_id,
    customer_id,
    created_at
FROM activities";

/// Query options for listing feed entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityListQuery {
    /// Restrict to entries referencing one user.
    pub user_id: Option<i64>,
    /// Maximum rows to return; `None` returns everything.
    pub limit: Option<u32>,
}

/// Repository interface for the activity feed.
pub trait ActivityRepository {
    /// Appends one feed entry and returns its id.
    fn append_activity(&self, activity: &NewActivity) -> RepoResult<ActivityId>;
    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>>;
    /// Lists feed entries, newest first.
    fn list_activities(&self, query: &ActivityListQuery) -> RepoResult<Vec<Activity>>;
}

/// SQLite-backed activity feed repository.
pub struct SqliteActivityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteActivityRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["activities"])?;
        Ok(Self { conn })
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn append_activity(&self, activity: &NewActivity) -> RepoResult<ActivityId> {
        insert_activity(self.conn, activity)
    }

    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTIVITY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_activity_row(row)?));
        }
        Ok(None)
    }

    fn list_activities(&self, query: &ActivityListQuery) -> RepoResult<Vec<Activity>> {
        let mut sql = String::from(ACTIVITY_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(user_id) = query.user_id {
            sql.push_str(" WHERE user_id = ?");
            bind_values.push(Value::Integer(user_id));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }
}

/// Raw insert shared with the audit recorder so it can write inside a
/// transaction the caller owns.
pub(crate) fn insert_activity(conn: &Connection, activity: &NewActivity) -> RepoResult<ActivityId> {
    conn.execute(
        "INSERT INTO activities (
            action,
            user_id,
            project_response_id,
            project_id,
            education_id,
            work_experience_id,
            customer_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            activity.action.as_str(),
            activity.user_id,
            activity.project_response_id,
            activity.project_id,
            activity.education_id,
            activity.work_experience_id,
            activity.customer_id,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    Ok(Activity {
        id: row.get("id")?,
        action: row.get("action")?,
        user_id: row.get("user_id")?,
        project_response_id: row.get("project_response_id")?,
        project_id: row.get("project_id")?,
        education_id: row.get("education_id")?,
        work_experience_id: row.get("work_experience_id")?,
        customer_id: row.get("customer_id")?,
        created_at: row.get("created_at")?,
    })
}
