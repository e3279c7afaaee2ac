//! Profile repository: education history and work experience.
//!
//! # Invariants
//! - Every row belongs to exactly one user and cascades with it.

use crate::model::experience::{
    Education, EducationId, EducationKind, NewEducation, NewWorkExperience, WorkExperience,
    WorkExperienceId,
};
use crate::model::user::UserId;
use crate::repo::{bool_to_int, ensure_connection_ready, parse_bool, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const EDUCATION_SELECT_SQL: &str = "SELECT
    id,
    title,
    school,
    extent,
    description,
    kind,
    starts_on,
    ends_on,
    highlight,
    user_id,
    created_at,
    updated_at,
    created_by,
    updated_by
FROM educations";

const WORK_EXPERIENCE_SELECT_SQL: &str = "SELECT
    id,
    title,
    employer,
    description,
    starts_on,
    ends_on,
    highlight,
    user_id,
    created_at,
    updated_at,
    created_by,
    updated_by
FROM work_experiences";

/// Repository interface for consultant profile history.
pub trait ExperienceRepository {
    fn create_education(
        &self,
        education: &NewEducation,
        actor: Option<UserId>,
    ) -> RepoResult<Education>;
    fn get_education(&self, id: EducationId) -> RepoResult<Option<Education>>;
    fn list_educations(&self) -> RepoResult<Vec<Education>>;
    /// Lists one user's education entries, ordered by id.
    fn educations_by_user(&self, user_id: UserId) -> RepoResult<Vec<Education>>;
    fn update_education(&self, education: &Education, actor: Option<UserId>)
        -> RepoResult<Education>;
    fn delete_education(&self, id: EducationId) -> RepoResult<()>;

    fn create_work_experience(
        &self,
        experience: &NewWorkExperience,
        actor: Option<UserId>,
    ) -> RepoResult<WorkExperience>;
    fn get_work_experience(&self, id: WorkExperienceId) -> RepoResult<Option<WorkExperience>>;
    fn list_work_experiences(&self) -> RepoResult<Vec<WorkExperience>>;
    /// Lists one user's work experience entries, ordered by id.
    fn work_experiences_by_user(&self, user_id: UserId) -> RepoResult<Vec<WorkExperience>>;
    fn update_work_experience(
        &self,
        experience: &WorkExperience,
        actor: Option<UserId>,
    ) -> RepoResult<WorkExperience>;
    fn delete_work_experience(&self, id: WorkExperienceId) -> RepoResult<()>;
}

/// SQLite-backed profile repository.
pub struct SqliteExperienceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteExperienceRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["educations", "work_experiences"])?;
        Ok(Self { conn })
    }
}

impl ExperienceRepository for SqliteExperienceRepository<'_> {
    fn create_education(
        &self,
        education: &NewEducation,
        actor: Option<UserId>,
    ) -> RepoResult<Education> {
        self.conn.execute(
            "INSERT INTO educations (
                title,
                school,
                extent,
                description,
                kind,
                starts_on,
                ends_on,
                highlight,
                user_id,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                education.title.as_str(),
                education.school.as_str(),
                education.extent.as_str(),
                education.description.as_str(),
                education_kind_to_db(education.kind),
                education.starts_on,
                education.ends_on,
                bool_to_int(education.highlight),
                education.user_id,
                actor,
                actor,
            ],
        )?;

        load_required_education(self.conn, self.conn.last_insert_rowid())
    }

    fn get_education(&self, id: EducationId) -> RepoResult<Option<Education>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EDUCATION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_education_row(row)?));
        }
        Ok(None)
    }

    fn list_educations(&self) -> RepoResult<Vec<Education>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EDUCATION_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut educations = Vec::new();
        while let Some(row) = rows.next()? {
            educations.push(parse_education_row(row)?);
        }
        Ok(educations)
    }

    fn educations_by_user(&self, user_id: UserId) -> RepoResult<Vec<Education>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EDUCATION_SELECT_SQL} WHERE user_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([user_id])?;
        let mut educations = Vec::new();
        while let Some(row) = rows.next()? {
            educations.push(parse_education_row(row)?);
        }
        Ok(educations)
    }

    fn update_education(
        &self,
        education: &Education,
        actor: Option<UserId>,
    ) -> RepoResult<Education> {
        let changed = self.conn.execute(
            "UPDATE educations
             SET
                title = ?2,
                school = ?3,
                extent = ?4,
                description = ?5,
                kind = ?6,
                starts_on = ?7,
                ends_on = ?8,
                highlight = ?9,
                updated_at = (strftime('%s', 'now') * 1000),
                updated_by = ?10
             WHERE id = ?1;",
            params![
                education.id,
                education.title.as_str(),
                education.school.as_str(),
                education.extent.as_str(),
                education.description.as_str(),
                education_kind_to_db(education.kind),
                education.starts_on,
                education.ends_on,
                bool_to_int(education.highlight),
                actor,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "education",
                id: education.id,
            });
        }

        load_required_education(self.conn, education.id)
    }

    fn delete_education(&self, id: EducationId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM educations WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "education",
                id,
            });
        }
        Ok(())
    }

    fn create_work_experience(
        &self,
        experience: &NewWorkExperience,
        actor: Option<UserId>,
    ) -> RepoResult<WorkExperience> {
        self.conn.execute(
            "INSERT INTO work_experiences (
                title,
                employer,
                description,
                starts_on,
                ends_on,
                highlight,
                user_id,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                experience.title.as_str(),
                experience.employer.as_str(),
                experience.description.as_str(),
                experience.starts_on,
                experience.ends_on,
                bool_to_int(experience.highlight),
                experience.user_id,
                actor,
                actor,
            ],
        )?;

        load_required_work_experience(self.conn, self.conn.last_insert_rowid())
    }

    fn get_work_experience(&self, id: WorkExperienceId) -> RepoResult<Option<WorkExperience>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{WORK_EXPERIENCE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_work_experience_row(row)?));
        }
        Ok(None)
    }

    fn list_work_experiences(&self) -> RepoResult<Vec<WorkExperience>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{WORK_EXPERIENCE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut experiences = Vec::new();
        while let Some(row) = rows.next()? {
            experiences.push(parse_work_experience_row(row)?);
        }
        Ok(experiences)
    }

    fn work_experiences_by_user(&self, user_id: UserId) -> RepoResult<Vec<WorkExperience>> {
        let mut stmt = self.conn.prepare(&format!(
            "{WORK_EXPERIENCE_SELECT_SQL} WHERE user_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([user_id])?;
        let mut experiences = Vec::new();
        while let Some(row) = rows.next()? {
            experiences.push(parse_work_experience_row(row)?);
        }
        Ok(experiences)
    }

    fn update_work_experience(
        &self,
        experience: &WorkExperience,
        actor: Option<UserId>,
    ) -> RepoResult<WorkExperience> {
        let changed = self.conn.execute(
            "UPDATE work_experiences
             SET
                title = ?2,
                employer = ?3,
                description = ?4,
                starts_on = ?5,
                ends_on = ?6,
                highlight = ?7,
                updated_at = (strftime('%s', 'now') * 1000),
                updated_by = ?8
             WHERE id = ?1;",
            params![
                experience.id,
                experience.title.as_str(),
                experience.employer.as_str(),
                experience.description.as_str(),
                experience.starts_on,
                experience.ends_on,
                bool_to_int(experience.highlight),
                actor,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "work experience",
                id: experience.id,
            });
        }

        load_required_work_experience(self.conn, experience.id)
    }

    fn delete_work_experience(&self, id: WorkExperienceId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM work_experiences WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "work experience",
                id,
            });
        }
        Ok(())
    }
}

fn load_required_education(conn: &Connection, id: EducationId) -> RepoResult<Education> {
    let mut stmt = conn.prepare(&format!("{EDUCATION_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_education_row(row);
    }
    Err(RepoError::NotFound {
        entity: "education",
        id,
    })
}

fn load_required_work_experience(
    conn: &Connection,
    id: WorkExperienceId,
) -> RepoResult<WorkExperience> {
    let mut stmt = conn.prepare(&format!("{WORK_EXPERIENCE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_work_experience_row(row);
    }
    Err(RepoError::NotFound {
        entity: "work experience",
        id,
    })
}

fn parse_education_row(row: &Row<'_>) -> RepoResult<Education> {
    let kind_text: String = row.get("kind")?;
    let kind = parse_education_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid kind value `{kind_text}` in educations.kind"))
    })?;

    Ok(Education {
        id: row.get("id")?,
        title: row.get("title")?,
        school: row.get("school")?,
        extent: row.get("extent")?,
        description: row.get("description")?,
        kind,
        starts_on: row.get("starts_on")?,
        ends_on: row.get("ends_on")?,
        highlight: parse_bool(row.get("highlight")?, "educations", "highlight")?,
        user_id: row.get("user_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    })
}

fn parse_work_experience_row(row: &Row<'_>) -> RepoResult<WorkExperience> {
    Ok(WorkExperience {
        id: row.get("id")?,
        title: row.get("title")?,
        employer: row.get("employer")?,
        description: row.get("description")?,
        starts_on: row.get("starts_on")?,
        ends_on: row.get("ends_on")?,
        highlight: parse_bool(row.get("highlight")?, "work_experiences", "highlight")?,
        user_id: row.get("user_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    })
}

fn education_kind_to_db(kind: EducationKind) -> &'static str {
    match kind {
        EducationKind::Education => "EDUCATION",
        EducationKind::Course => "COURSE",
        EducationKind::InternalCourse => "INTERNAL_COURSE",
    }
}

fn parse_education_kind(value: &str) -> Option<EducationKind> {
    match value {
        "EDUCATION" => Some(EducationKind::Education),
        "COURSE" => Some(EducationKind::Course),
        "INTERNAL_COURSE" => Some(EducationKind::InternalCourse),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{education_kind_to_db, parse_education_kind};
    use crate::model::experience::EducationKind;

    #[test]
    fn education_kind_codec_round_trips() {
        for kind in [
            EducationKind::Education,
            EducationKind::Course,
            EducationKind::InternalCourse,
        ] {
            assert_eq!(parse_education_kind(education_kind_to_db(kind)), Some(kind));
        }
    }

    #[test]
    fn unknown_education_kind_is_rejected() {
        assert_eq!(parse_education_kind("BOOTCAMP"), None);
        assert_eq!(parse_education_kind("education"), None);
    }
}
