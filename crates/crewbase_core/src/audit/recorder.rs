//! Response change recorder.
//!
//! # Responsibility
//! - Decide whether a response change deserves a feed entry.
//! - Render the entry sentence and append it to `activities`.
//!
//! # Invariants
//! - Only `Interested`, `Accepted` and `Proposed` produce sentences.
//! - Updates that keep the response kind unchanged are suppressed.

use crate::model::activity::{ActivityId, NewActivity};
use crate::model::project::{ProjectId, ProjectResponseId, ResponseKind};
use crate::model::user::UserId;
use crate::repo::activity_repo::insert_activity;
use crate::repo::RepoResult;
use log::{debug, warn};
use rusqlite::{Connection, OptionalExtension};

/// Explicit description of one staged project response write.
///
/// Assembled by the repository inside the same transaction that writes the
/// response row, then handed to [`record_response_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseChange {
    pub response_id: ProjectResponseId,
    pub user_id: Option<UserId>,
    pub project_id: Option<ProjectId>,
    /// Kind after the write.
    pub kind: ResponseKind,
    /// Kind before the write. `None` for freshly created responses.
    pub previous_kind: Option<ResponseKind>,
    pub is_new: bool,
}

/// Renders the feed sentence for a response kind, if the kind is loggable.
pub fn response_action(kind: ResponseKind, user: &str, project: &str) -> Option<String> {
    match kind {
        ResponseKind::Interested => Some(format!("{user} is interested in the project {project}")),
        ResponseKind::Accepted => Some(format!("{user} was accepted for the project {project}")),
        ResponseKind::Proposed => Some(format!("{user} was proposed for the project {project}")),
        ResponseKind::Empty | ResponseKind::Rejected => None,
    }
}

/// Appends a feed row for the given change when one is warranted.
///
/// Call with the same connection/transaction that staged the response
/// write. Returns the new activity id, or `None` when the change is
/// suppressed, unloggable, or references vanished rows.
pub fn record_response_change(
    conn: &Connection,
    change: &ResponseChange,
) -> RepoResult<Option<ActivityId>> {
    if !change.is_new && change.previous_kind == Some(change.kind) {
        debug!(
            "event=activity_record module=audit status=suppressed response_id={} reason=kind_unchanged",
            change.response_id
        );
        return Ok(None);
    }

    let Some(user_id) = change.user_id else {
        warn!(
            "event=activity_record module=audit status=skipped response_id={} reason=missing_user",
            change.response_id
        );
        return Ok(None);
    };
    let Some(project_id) = change.project_id else {
        warn!(
            "event=activity_record module=audit status=skipped response_id={} reason=missing_project",
            change.response_id
        );
        return Ok(None);
    };

    let Some(user) = load_user_label(conn, user_id)? else {
        warn!(
            "event=activity_record module=audit status=skipped response_id={} reason=missing_user user_id={user_id}",
            change.response_id
        );
        return Ok(None);
    };
    let Some(project) = load_project_label(conn, project_id)? else {
        warn!(
            "event=activity_record module=audit status=skipped response_id={} reason=missing_project project_id={project_id}",
            change.response_id
        );
        return Ok(None);
    };

    let Some(action) = response_action(change.kind, &user, &project) else {
        return Ok(None);
    };

    let activity_id = insert_activity(
        conn,
        &NewActivity {
            action,
            user_id: Some(user_id),
            project_response_id: Some(change.response_id),
            ..NewActivity::default()
        },
    )?;

    debug!(
        "event=activity_record module=audit status=ok response_id={} activity_id={activity_id}",
        change.response_id
    );
    Ok(Some(activity_id))
}

/// Label shown as the sentence subject: display name, or email as fallback.
pub fn user_label(name: Option<&str>, email: &str) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => email.to_string(),
    }
}

/// Label shown as the sentence object: title, plus customer name when set.
pub fn project_label(title: &str, customer_name: Option<&str>) -> String {
    match customer_name {
        Some(customer) if !customer.is_empty() => format!("{title}, {customer}"),
        _ => title.to_string(),
    }
}

fn load_user_label(conn: &Connection, id: UserId) -> RepoResult<Option<String>> {
    let row = conn
        .query_row(
            "SELECT name, email FROM users WHERE id = ?1;",
            [id],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, String>(1)?,
                ))
            },
        )
        .optional()?;
    Ok(row.map(|(name, email)| user_label(name.as_deref(), &email)))
}

fn load_project_label(conn: &Connection, id: ProjectId) -> RepoResult<Option<String>> {
    let row = conn
        .query_row(
            "SELECT p.title, c.name
             FROM projects p
             LEFT JOIN customers c ON c.id = p.customer_id
             WHERE p.id = ?1;",
            [id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                ))
            },
        )
        .optional()?;
    Ok(row.map(|(title, customer)| project_label(&title, customer.as_deref())))
}

#[cfg(test)]
mod tests {
    use super::{project_label, response_action, user_label};
    use crate::model::project::ResponseKind;

    #[test]
    fn loggable_kinds_render_expected_sentences() {
        assert_eq!(
            response_action(ResponseKind::Interested, "Jane Doe", "Cool Project").as_deref(),
            Some("Jane Doe is interested in the project Cool Project")
        );
        assert_eq!(
            response_action(ResponseKind::Accepted, "Jane Doe", "Cool Project").as_deref(),
            Some("Jane Doe was accepted for the project Cool Project")
        );
        assert_eq!(
            response_action(ResponseKind::Proposed, "Jane Doe", "Cool Project").as_deref(),
            Some("Jane Doe was proposed for the project Cool Project")
        );
    }

    #[test]
    fn silent_kinds_render_nothing() {
        assert_eq!(response_action(ResponseKind::Empty, "a", "b"), None);
        assert_eq!(response_action(ResponseKind::Rejected, "a", "b"), None);
    }

    #[test]
    fn user_label_falls_back_to_email() {
        assert_eq!(user_label(Some("Jane Doe"), "jane@firm.se"), "Jane Doe");
        assert_eq!(user_label(Some(""), "jane@firm.se"), "jane@firm.se");
        assert_eq!(user_label(None, "jane@firm.se"), "jane@firm.se");
    }

    #[test]
    fn project_label_appends_customer_when_present() {
        assert_eq!(project_label("Cool Project", None), "Cool Project");
        assert_eq!(project_label("Cool Project", Some("")), "Cool Project");
        assert_eq!(
            project_label("Cool Project", Some("Volvo")),
            "Cool Project, Volvo"
        );
    }
}
