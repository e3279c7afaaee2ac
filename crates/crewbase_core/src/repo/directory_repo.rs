//! Directory repository: users and the role/group hierarchy they belong to.
//!
//! # Responsibility
//! - Provide CRUD APIs over `users`, `roles` and `groups` storage.
//! - Expose flat parent edges so hierarchy resolution stays in the service
//!   layer instead of recursive SQL.
//!
//! # Invariants
//! - `created_by`/`updated_by` always come from the explicit actor argument.
//! - Deleting a role/group never deletes members; their FK columns reset to
//!   `NULL` via schema policy.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::org::{Group, GroupId, NewGroup, NewRole, Role, RoleId};
use crate::model::user::{NewUser, User, UserId, UserKind};
use crate::repo::{
    bool_to_int, ensure_connection_ready, parse_bool, RepoError, RepoResult,
};
use rusqlite::{params, params_from_iter, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    email,
    name,
    verified,
    admin,
    kind,
    registered_at,
    role_id,
    group_id,
    created_at,
    updated_at,
    created_by,
    updated_by
FROM users";

const ROLE_SELECT_SQL: &str = "SELECT
    id,
    name,
    parent_role_id,
    created_at,
    updated_at,
    created_by,
    updated_by
FROM roles";

const GROUP_SELECT_SQL: &str = "SELECT
    id,
    name,
    address,
    zipcode,
    city,
    country,
    parent_group_id,
    created_at,
    updated_at,
    created_by,
    updated_by
FROM groups";

/// One `(node, parent)` edge of the role or group forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeEdge {
    pub id: i64,
    pub parent_id: Option<i64>,
}

/// Repository interface for directory records.
pub trait DirectoryRepository {
    fn create_user(&self, user: &NewUser, actor: Option<UserId>) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn update_user(&self, user: &User, actor: Option<UserId>) -> RepoResult<User>;
    fn set_user_verified(
        &self,
        id: UserId,
        verified: bool,
        actor: Option<UserId>,
    ) -> RepoResult<User>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;

    fn create_role(&self, role: &NewRole, actor: Option<UserId>) -> RepoResult<Role>;
    fn get_role(&self, id: RoleId) -> RepoResult<Option<Role>>;
    fn list_roles(&self) -> RepoResult<Vec<Role>>;
    fn update_role(&self, role: &Role, actor: Option<UserId>) -> RepoResult<Role>;
    fn delete_role(&self, id: RoleId) -> RepoResult<()>;

    fn create_group(&self, group: &NewGroup, actor: Option<UserId>) -> RepoResult<Group>;
    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>>;
    fn list_groups(&self) -> RepoResult<Vec<Group>>;
    fn update_group(&self, group: &Group, actor: Option<UserId>) -> RepoResult<Group>;
    fn delete_group(&self, id: GroupId) -> RepoResult<()>;

    /// Returns every `(role, parent_role)` edge, ordered by role id.
    fn role_edges(&self) -> RepoResult<Vec<NodeEdge>>;
    /// Returns every `(group, parent_group)` edge, ordered by group id.
    fn group_edges(&self) -> RepoResult<Vec<NodeEdge>>;
    /// Lists users whose role is any of the given ids, ordered by user id.
    fn users_by_role_ids(&self, role_ids: &[RoleId]) -> RepoResult<Vec<User>>;
    /// Lists users whose group is any of the given ids, ordered by user id.
    fn users_by_group_ids(&self, group_ids: &[GroupId]) -> RepoResult<Vec<User>>;
}

/// SQLite-backed directory repository.
pub struct SqliteDirectoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDirectoryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["users", "roles", "groups"])?;
        Ok(Self { conn })
    }
}

impl DirectoryRepository for SqliteDirectoryRepository<'_> {
    fn create_user(&self, user: &NewUser, actor: Option<UserId>) -> RepoResult<User> {
        self.conn.execute(
            "INSERT INTO users (
                email,
                name,
                admin,
                kind,
                role_id,
                group_id,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                user.email.as_str(),
                user.name.as_deref(),
                bool_to_int(user.admin),
                user_kind_to_db(user.kind),
                user.role_id,
                user.group_id,
                actor,
                actor,
            ],
        )?;

        load_required_user(self.conn, self.conn.last_insert_rowid())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE email = ?1;"))?;
        let mut rows = stmt.query([email])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn update_user(&self, user: &User, actor: Option<UserId>) -> RepoResult<User> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                email = ?2,
                name = ?3,
                verified = ?4,
                admin = ?5,
                kind = ?6,
                role_id = ?7,
                group_id = ?8,
                updated_at = (strftime('%s', 'now') * 1000),
                updated_by = ?9
             WHERE id = ?1;",
            params![
                user.id,
                user.email.as_str(),
                user.name.as_deref(),
                bool_to_int(user.verified),
                bool_to_int(user.admin),
                user_kind_to_db(user.kind),
                user.role_id,
                user.group_id,
                actor,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: user.id,
            });
        }

        load_required_user(self.conn, user.id)
    }

    fn set_user_verified(
        &self,
        id: UserId,
        verified: bool,
        actor: Option<UserId>,
    ) -> RepoResult<User> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                verified = ?2,
                updated_at = (strftime('%s', 'now') * 1000),
                updated_by = ?3
             WHERE id = ?1;",
            params![id, bool_to_int(verified), actor],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }

        load_required_user(self.conn, id)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }

    fn create_role(&self, role: &NewRole, actor: Option<UserId>) -> RepoResult<Role> {
        self.conn.execute(
            "INSERT INTO roles (name, parent_role_id, created_by, updated_by)
             VALUES (?1, ?2, ?3, ?4);",
            params![role.name.as_str(), role.parent_role_id, actor, actor],
        )?;

        load_required_role(self.conn, self.conn.last_insert_rowid())
    }

    fn get_role(&self, id: RoleId) -> RepoResult<Option<Role>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ROLE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_role_row(row)?));
        }
        Ok(None)
    }

    fn list_roles(&self) -> RepoResult<Vec<Role>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ROLE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut roles = Vec::new();
        while let Some(row) = rows.next()? {
            roles.push(parse_role_row(row)?);
        }
        Ok(roles)
    }

    fn update_role(&self, role: &Role, actor: Option<UserId>) -> RepoResult<Role> {
        let changed = self.conn.execute(
            "UPDATE roles
             SET
                name = ?2,
                parent_role_id = ?3,
                updated_at = (strftime('%s', 'now') * 1000),
                updated_by = ?4
             WHERE id = ?1;",
            params![role.id, role.name.as_str(), role.parent_role_id, actor],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "role",
                id: role.id,
            });
        }

        load_required_role(self.conn, role.id)
    }

    fn delete_role(&self, id: RoleId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM roles WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "role", id });
        }
        Ok(())
    }

    fn create_group(&self, group: &NewGroup, actor: Option<UserId>) -> RepoResult<Group> {
        self.conn.execute(
            "INSERT INTO groups (
                name,
                address,
                zipcode,
                city,
                country,
                parent_group_id,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                group.name.as_str(),
                group.address.as_deref(),
                group.zipcode.as_deref(),
                group.city.as_deref(),
                group.country.as_deref(),
                group.parent_group_id,
                actor,
                actor,
            ],
        )?;

        load_required_group(self.conn, self.conn.last_insert_rowid())
    }

    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GROUP_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_group_row(row)?));
        }
        Ok(None)
    }

    fn list_groups(&self) -> RepoResult<Vec<Group>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GROUP_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            groups.push(parse_group_row(row)?);
        }
        Ok(groups)
    }

    fn update_group(&self, group: &Group, actor: Option<UserId>) -> RepoResult<Group> {
        let changed = self.conn.execute(
            "UPDATE groups
             SET
                name = ?2,
                address = ?3,
                zipcode = ?4,
                city = ?5,
                country = ?6,
                parent_group_id = ?7,
                updated_at = (strftime('%s', 'now') * 1000),
                updated_by = ?8
             WHERE id = ?1;",
            params![
                group.id,
                group.name.as_str(),
                group.address.as_deref(),
                group.zipcode.as_deref(),
                group.city.as_deref(),
                group.country.as_deref(),
                group.parent_group_id,
                actor,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "group",
                id: group.id,
            });
        }

        load_required_group(self.conn, group.id)
    }

    fn delete_group(&self, id: GroupId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM groups WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "group", id });
        }
        Ok(())
    }

    fn role_edges(&self) -> RepoResult<Vec<NodeEdge>> {
        load_edges(self.conn, "SELECT id, parent_role_id FROM roles ORDER BY id ASC;")
    }

    fn group_edges(&self) -> RepoResult<Vec<NodeEdge>> {
        load_edges(
            self.conn,
            "SELECT id, parent_group_id FROM groups ORDER BY id ASC;",
        )
    }

    fn users_by_role_ids(&self, role_ids: &[RoleId]) -> RepoResult<Vec<User>> {
        load_users_by_fk(self.conn, "role_id", role_ids)
    }

    fn users_by_group_ids(&self, group_ids: &[GroupId]) -> RepoResult<Vec<User>> {
        load_users_by_fk(self.conn, "group_id", group_ids)
    }
}

fn load_edges(conn: &Connection, sql: &str) -> RepoResult<Vec<NodeEdge>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut edges = Vec::new();
    while let Some(row) = rows.next()? {
        edges.push(NodeEdge {
            id: row.get(0)?,
            parent_id: row.get(1)?,
        });
    }
    Ok(edges)
}

fn load_users_by_fk(conn: &Connection, column: &str, ids: &[i64]) -> RepoResult<Vec<User>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("{USER_SELECT_SQL} WHERE {column} IN ({placeholders}) ORDER BY id ASC;");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(ids.iter().copied()))?;
    let mut users = Vec::new();
    while let Some(row) = rows.next()? {
        users.push(parse_user_row(row)?);
    }
    Ok(users)
}

fn load_required_user(conn: &Connection, id: UserId) -> RepoResult<User> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_user_row(row);
    }
    Err(RepoError::NotFound { entity: "user", id })
}

fn load_required_role(conn: &Connection, id: RoleId) -> RepoResult<Role> {
    let mut stmt = conn.prepare(&format!("{ROLE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_role_row(row);
    }
    Err(RepoError::NotFound { entity: "role", id })
}

fn load_required_group(conn: &Connection, id: GroupId) -> RepoResult<Group> {
    let mut stmt = conn.prepare(&format!("{GROUP_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_group_row(row);
    }
    Err(RepoError::NotFound { entity: "group", id })
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let kind_value: i64 = row.get("kind")?;
    let kind = parse_user_kind(kind_value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid kind value `{kind_value}` in users.kind"))
    })?;

    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        name: row.get("name")?,
        verified: parse_bool(row.get("verified")?, "users", "verified")?,
        admin: parse_bool(row.get("admin")?, "users", "admin")?,
        kind,
        registered_at: row.get("registered_at")?,
        role_id: row.get("role_id")?,
        group_id: row.get("group_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    })
}

fn parse_role_row(row: &Row<'_>) -> RepoResult<Role> {
    Ok(Role {
        id: row.get("id")?,
        name: row.get("name")?,
        parent_role_id: row.get("parent_role_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    })
}

fn parse_group_row(row: &Row<'_>) -> RepoResult<Group> {
    Ok(Group {
        id: row.get("id")?,
        name: row.get("name")?,
        address: row.get("address")?,
        zipcode: row.get("zipcode")?,
        city: row.get("city")?,
        country: row.get("country")?,
        parent_group_id: row.get("parent_group_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    })
}

fn user_kind_to_db(kind: UserKind) -> i64 {
    match kind {
        UserKind::Admin => 1,
        UserKind::SuperUser => 2,
        UserKind::Member => 3,
    }
}

fn parse_user_kind(value: i64) -> Option<UserKind> {
    match value {
        1 => Some(UserKind::Admin),
        2 => Some(UserKind::SuperUser),
        3 => Some(UserKind::Member),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_user_kind, user_kind_to_db};
    use crate::model::user::UserKind;

    #[test]
    fn user_kind_codec_round_trips() {
        for kind in [UserKind::Admin, UserKind::SuperUser, UserKind::Member] {
            assert_eq!(parse_user_kind(user_kind_to_db(kind)), Some(kind));
        }
    }

    #[test]
    fn unknown_user_kind_is_rejected() {
        assert_eq!(parse_user_kind(0), None);
        assert_eq!(parse_user_kind(4), None);
    }
}
