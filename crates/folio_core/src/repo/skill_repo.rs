//! Skill repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide lookup of skills referenced by project aggregates.
//! - Provide the minimal writes needed to maintain the taxonomy.
//!
//! # Invariants
//! - Writes call `NewSkill::validate()` first, so a `LANGUAGE` skill is
//!   never stored with a category.
//! - Deleting a skill drops its project associations through cascade.

use crate::model::taxonomy::{NewSkill, Skill, SkillId, SkillType};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::schema::{ensure_connection_ready, parse_uuid, CATEGORIES_TABLE, SKILLS_TABLE};
use crate::slug::slugify;
use log::info;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const SKILL_SELECT_SQL: &str = "SELECT
    id,
    name,
    slug,
    type,
    icon,
    category_id
FROM skills";

/// Repository interface for skill lookup and maintenance.
pub trait SkillRepository {
    /// Creates one skill and returns the stored row.
    fn create_skill(&self, input: &NewSkill) -> RepoResult<Skill>;
    fn get_skill(&self, id: SkillId) -> RepoResult<Option<Skill>>;
    /// Lists all skills sorted by name.
    fn list_skills(&self) -> RepoResult<Vec<Skill>>;
    fn delete_skill(&self, id: SkillId) -> RepoResult<()>;
}

/// SQLite-backed skill repository.
pub struct SqliteSkillRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSkillRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[CATEGORIES_TABLE, SKILLS_TABLE])?;
        Ok(Self { conn })
    }
}

impl SkillRepository for SqliteSkillRepository<'_> {
    fn create_skill(&self, input: &NewSkill) -> RepoResult<Skill> {
        input.validate()?;

        let skill = Skill {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            slug: slugify(&input.name),
            skill_type: input.skill_type,
            icon: input.icon.clone(),
            category_id: input.category_id,
        };
        self.conn.execute(
            "INSERT INTO skills (
                id,
                name,
                slug,
                type,
                icon,
                category_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                skill.id.to_string(),
                skill.name.as_str(),
                skill.slug.as_str(),
                skill.skill_type.as_db(),
                skill.icon.as_deref(),
                skill.category_id.map(|id| id.to_string()),
            ],
        )?;

        info!(
            "event=skill_create module=repo status=ok skill_id={} type={}",
            skill.id,
            skill.skill_type.as_db()
        );
        Ok(skill)
    }

    fn get_skill(&self, id: SkillId) -> RepoResult<Option<Skill>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SKILL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_skill_row(row)?));
        }
        Ok(None)
    }

    fn list_skills(&self) -> RepoResult<Vec<Skill>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SKILL_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut skills = Vec::new();
        while let Some(row) = rows.next()? {
            skills.push(parse_skill_row(row)?);
        }
        Ok(skills)
    }

    fn delete_skill(&self, id: SkillId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM skills WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::SkillNotFound(id));
        }
        info!("event=skill_delete module=repo status=ok skill_id={id}");
        Ok(())
    }
}

/// Decodes one row exposing `id`, `name`, `slug`, `type`, `icon`, `category_id`.
pub(crate) fn parse_skill_row(row: &Row<'_>) -> RepoResult<Skill> {
    let id_text: String = row.get("id")?;
    let type_text: String = row.get("type")?;
    let skill_type = SkillType::from_db(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid skill type `{type_text}` in skills.type"))
    })?;
    let category_id = row
        .get::<_, Option<String>>("category_id")?
        .map(|value| parse_uuid(&value, "skills.category_id"))
        .transpose()?;

    Ok(Skill {
        id: parse_uuid(&id_text, "skills.id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        skill_type,
        icon: row.get("icon")?,
        category_id,
    })
}
