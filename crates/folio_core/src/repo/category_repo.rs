//! Category repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide lookup of categories referenced by project aggregates.
//! - Provide the minimal writes needed to maintain the taxonomy.
//!
//! # Invariants
//! - Category slugs are derived from names.
//! - Deleting a category is never blocked by project associations; join
//!   rows cascade and owned skills fall back to `category_id = NULL`.

use crate::model::taxonomy::{Category, CategoryId, NewCategory};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::schema::{
    bool_to_int, ensure_connection_ready, parse_bool, parse_uuid, CATEGORIES_TABLE,
};
use crate::slug::slugify;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const CATEGORY_SELECT_SQL: &str = "SELECT
    id,
    name,
    slug,
    description,
    is_visible
FROM categories";

/// Repository interface for category lookup and maintenance.
pub trait CategoryRepository {
    /// Creates one category and returns the stored row.
    fn create_category(&self, input: &NewCategory) -> RepoResult<Category>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// Resolves a category by slug; the earliest created wins on duplicates.
    fn get_category_by_slug(&self, slug: &str) -> RepoResult<Option<Category>>;
    /// Lists all categories sorted by name.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    fn delete_category(&self, id: CategoryId) -> RepoResult<()>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[CATEGORIES_TABLE])?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, input: &NewCategory) -> RepoResult<Category> {
        input.validate()?;

        let category = Category {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            slug: slugify(&input.name),
            description: input.description.clone(),
            is_visible: input.is_visible,
        };
        self.conn.execute(
            "INSERT INTO categories (
                id,
                name,
                slug,
                description,
                is_visible
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                category.id.to_string(),
                category.name.as_str(),
                category.slug.as_str(),
                category.description.as_deref(),
                bool_to_int(category.is_visible),
            ],
        )?;

        info!(
            "event=category_create module=repo status=ok category_id={}",
            category.id
        );
        Ok(category)
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn get_category_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        find_category_by_slug(self.conn, slug)
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::CategoryNotFound(id));
        }
        info!("event=category_delete module=repo status=ok category_id={id}");
        Ok(())
    }
}

pub(crate) fn find_category_by_slug(conn: &Connection, slug: &str) -> RepoResult<Option<Category>> {
    let mut stmt = conn.prepare(&format!(
        "{CATEGORY_SELECT_SQL}
         WHERE slug = ?1
         ORDER BY created_at ASC, rowid ASC
         LIMIT 1;"
    ))?;
    stmt.query_row([slug], |row| Ok(parse_category_row(row)))
        .optional()?
        .transpose()
}

/// Decodes one row exposing `id`, `name`, `slug`, `description`, `is_visible`.
pub(crate) fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let id_text: String = row.get("id")?;
    Ok(Category {
        id: parse_uuid(&id_text, "categories.id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        is_visible: parse_bool(row.get("is_visible")?, "categories.is_visible")?,
    })
}
