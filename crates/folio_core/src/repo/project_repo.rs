//! Project aggregate repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own project rows and their `project_skills`/`project_categories` join rows.
//! - Enforce the featured cap and the display-order swap under concurrency.
//! - Return fully hydrated aggregates from every read and write.
//!
//! # Invariants
//! - Every write runs in one `BEGIN IMMEDIATE` transaction, so the featured
//!   count check and the order-swap read-then-write cannot interleave with
//!   another writer.
//! - At most `FEATURED_PROJECT_LIMIT` rows have `is_featured = 1`.
//! - Relation sets are replaced wholesale (delete then insert) when a patch
//!   carries them, and left untouched otherwise.
//! - `display_order` is not unique; a requested order held by another row is
//!   exchanged with the target's prior order, and nothing else is renumbered.
//! - Catalog order is `is_featured DESC, display_order ASC, id ASC`.

use crate::model::project::{
    Project, ProjectId, ProjectInsert, ProjectUpdate, ProjectWithRelations,
    FEATURED_PROJECT_LIMIT,
};
use crate::repo::category_repo::find_category_by_slug;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::relations::attach_relations;
use crate::repo::schema::{
    bool_to_int, ensure_connection_ready, now_epoch_ms, optional_text, json_id_array,
    parse_bool, parse_uuid, CATEGORIES_TABLE, PROJECTS_TABLE, PROJECT_CATEGORIES_TABLE,
    PROJECT_SKILLS_TABLE, SKILLS_TABLE,
};
use crate::slug::slugify;
use log::{debug, info, warn};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    title,
    slug,
    short_description,
    long_description,
    thumbnail_url,
    github_url,
    demo_url,
    docs_url,
    video_url,
    is_featured,
    display_order,
    created_at,
    updated_at
FROM projects";

/// Repository interface for project aggregate reads and writes.
pub trait ProjectRepository {
    /// Lists every project, featured first, then by display order.
    fn list(&self) -> RepoResult<Vec<ProjectWithRelations>>;
    /// Lists up to `limit` featured projects by display order.
    fn list_featured(&self, limit: u32) -> RepoResult<Vec<ProjectWithRelations>>;
    fn get_by_id(&self, id: ProjectId) -> RepoResult<Option<ProjectWithRelations>>;
    /// Loads one project by slug; the earliest created wins on duplicates.
    fn get_by_slug(&self, slug: &str) -> RepoResult<Option<ProjectWithRelations>>;
    /// Lists projects linked to the category with `slug`, by display order.
    ///
    /// An unknown slug yields an empty list rather than an error.
    fn list_by_category_slug(&self, slug: &str) -> RepoResult<Vec<ProjectWithRelations>>;
    /// Creates one project with its initial relation sets.
    fn create(&self, input: &ProjectInsert) -> RepoResult<ProjectWithRelations>;
    /// Applies a sparse patch, including the order-swap and relation replacement.
    fn update(&self, id: ProjectId, patch: &ProjectUpdate) -> RepoResult<ProjectWithRelations>;
    /// Deletes one project; join rows go with it.
    fn delete(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project aggregate repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                CATEGORIES_TABLE,
                SKILLS_TABLE,
                PROJECTS_TABLE,
                PROJECT_SKILLS_TABLE,
                PROJECT_CATEGORIES_TABLE,
            ],
        )?;
        Ok(Self { conn })
    }

    // Reads run inside one deferred transaction so project rows and both
    // relation queries observe the same snapshot.
    fn read<T>(&self, op: impl FnOnce(&Connection) -> RepoResult<T>) -> RepoResult<T> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn list(&self) -> RepoResult<Vec<ProjectWithRelations>> {
        self.read(|conn| {
            let projects = query_projects(
                conn,
                &format!(
                    "{PROJECT_SELECT_SQL}
                     ORDER BY is_featured DESC, display_order ASC, id ASC;"
                ),
                Vec::new(),
            )?;
            attach_relations(conn, projects)
        })
    }

    fn list_featured(&self, limit: u32) -> RepoResult<Vec<ProjectWithRelations>> {
        self.read(|conn| {
            let projects = query_projects(
                conn,
                &format!(
                    "{PROJECT_SELECT_SQL}
                     WHERE is_featured = 1
                     ORDER BY display_order ASC, id ASC
                     LIMIT ?;"
                ),
                vec![Value::Integer(i64::from(limit))],
            )?;
            attach_relations(conn, projects)
        })
    }

    fn get_by_id(&self, id: ProjectId) -> RepoResult<Option<ProjectWithRelations>> {
        self.read(|conn| match load_project(conn, id)? {
            Some(project) => Ok(attach_relations(conn, vec![project])?.pop()),
            None => Ok(None),
        })
    }

    fn get_by_slug(&self, slug: &str) -> RepoResult<Option<ProjectWithRelations>> {
        self.read(|conn| {
            let projects = query_projects(
                conn,
                &format!(
                    "{PROJECT_SELECT_SQL}
                     WHERE slug = ?
                     ORDER BY created_at ASC, rowid ASC
                     LIMIT 1;"
                ),
                vec![Value::Text(slug.to_string())],
            )?;
            Ok(attach_relations(conn, projects)?.pop())
        })
    }

    fn list_by_category_slug(&self, slug: &str) -> RepoResult<Vec<ProjectWithRelations>> {
        self.read(|conn| {
            let Some(category) = find_category_by_slug(conn, slug)? else {
                debug!("event=project_filter module=repo status=empty reason=unknown_category");
                return Ok(Vec::new());
            };

            let projects = query_projects(
                conn,
                &format!(
                    "{PROJECT_SELECT_SQL}
                     WHERE id IN (
                         SELECT project_id FROM project_categories WHERE category_id = ?
                     )
                     ORDER BY display_order ASC, id ASC;"
                ),
                vec![Value::Text(category.id.to_string())],
            )?;
            attach_relations(conn, projects)
        })
    }

    fn create(&self, input: &ProjectInsert) -> RepoResult<ProjectWithRelations> {
        input.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if input.is_featured {
            ensure_featured_capacity(&tx, None)?;
        }

        let id = Uuid::new_v4();
        let display_order = match input.display_order {
            Some(order) => order,
            None => next_display_order(&tx)?,
        };
        let now = now_epoch_ms();
        tx.execute(
            "INSERT INTO projects (
                id,
                title,
                slug,
                short_description,
                long_description,
                thumbnail_url,
                github_url,
                demo_url,
                docs_url,
                video_url,
                is_featured,
                display_order,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13);",
            params![
                id.to_string(),
                input.title.as_str(),
                input.derived_slug(),
                input.short_description.as_str(),
                input.long_description.as_str(),
                input.thumbnail_url.as_deref(),
                input.github_url.as_deref(),
                input.demo_url.as_deref(),
                input.docs_url.as_deref(),
                input.video_url.as_deref(),
                bool_to_int(input.is_featured),
                display_order,
                now,
            ],
        )?;
        insert_links(&tx, Link::Skills, id, &input.skill_ids)?;
        insert_links(&tx, Link::Categories, id, &input.category_ids)?;

        let created = load_hydrated(&tx, id)?;
        tx.commit()?;

        info!(
            "event=project_create module=repo status=ok project_id={} featured={} display_order={} skills={} categories={}",
            id,
            created.project.is_featured,
            created.project.display_order,
            created.skills.len(),
            created.categories.len()
        );
        Ok(created)
    }

    fn update(&self, id: ProjectId, patch: &ProjectUpdate) -> RepoResult<ProjectWithRelations> {
        patch.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current = load_project(&tx, id)?.ok_or(RepoError::ProjectNotFound(id))?;

        if patch.is_featured == Some(true) && !current.is_featured {
            ensure_featured_capacity(&tx, Some(id))?;
        }

        let swapped_with = match patch.display_order {
            Some(requested) if requested != current.display_order => {
                swap_display_order(&tx, id, current.display_order, requested)?
            }
            _ => None,
        };

        apply_column_patch(&tx, id, patch)?;
        if let Some(skill_ids) = patch.skill_ids.as_deref() {
            replace_links(&tx, Link::Skills, id, skill_ids)?;
        }
        if let Some(category_ids) = patch.category_ids.as_deref() {
            replace_links(&tx, Link::Categories, id, category_ids)?;
        }

        let updated = load_hydrated(&tx, id)?;
        tx.commit()?;

        info!(
            "event=project_update module=repo status=ok project_id={} swapped_with={} skills_replaced={} categories_replaced={}",
            id,
            swapped_with.map_or_else(|| "none".to_string(), |other| other.to_string()),
            patch.skill_ids.is_some(),
            patch.category_ids.is_some()
        );
        Ok(updated)
    }

    fn delete(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ProjectNotFound(id));
        }
        info!("event=project_delete module=repo status=ok project_id={id}");
        Ok(())
    }
}

/// Join table owned by the project aggregate.
#[derive(Debug, Clone, Copy)]
enum Link {
    Skills,
    Categories,
}

impl Link {
    fn table(self) -> &'static str {
        match self {
            Self::Skills => "project_skills",
            Self::Categories => "project_categories",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Skills => "skill_id",
            Self::Categories => "category_id",
        }
    }
}

fn ensure_featured_capacity(conn: &Connection, excluding: Option<ProjectId>) -> RepoResult<()> {
    let featured: i64 = conn.query_row(
        "SELECT COUNT(*)
         FROM projects
         WHERE is_featured = 1
           AND (?1 IS NULL OR id <> ?1);",
        params![excluding.map(|id| id.to_string())],
        |row| row.get(0),
    )?;

    if featured >= FEATURED_PROJECT_LIMIT as i64 {
        warn!(
            "event=featured_limit_rejected module=repo status=rejected featured={} limit={}",
            featured, FEATURED_PROJECT_LIMIT
        );
        return Err(RepoError::FeaturedLimitExceeded {
            limit: FEATURED_PROJECT_LIMIT,
        });
    }
    Ok(())
}

fn next_display_order(conn: &Connection) -> RepoResult<i64> {
    let next = conn.query_row(
        "SELECT COALESCE(MAX(display_order), -1) + 1 FROM projects;",
        [],
        |row| row.get(0),
    )?;
    Ok(next)
}

/// Hands `prior_order` to the other project currently holding `requested`.
///
/// Returns the id of the project that received `prior_order`, if any.
fn swap_display_order(
    conn: &Connection,
    id: ProjectId,
    prior_order: i64,
    requested: i64,
) -> RepoResult<Option<ProjectId>> {
    let holder: Option<String> = conn
        .query_row(
            "SELECT id
             FROM projects
             WHERE display_order = ?1
               AND id <> ?2
             ORDER BY created_at ASC, rowid ASC
             LIMIT 1;",
            params![requested, id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    let Some(holder) = holder else {
        return Ok(None);
    };

    conn.execute(
        "UPDATE projects
         SET display_order = ?2,
             updated_at = ?3
         WHERE id = ?1;",
        params![holder.as_str(), prior_order, now_epoch_ms()],
    )?;
    Ok(Some(parse_uuid(&holder, "projects.id")?))
}

fn apply_column_patch(conn: &Connection, id: ProjectId, patch: &ProjectUpdate) -> RepoResult<()> {
    let mut assignments: Vec<&'static str> = Vec::new();
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(title) = patch.title.as_ref() {
        assignments.push("title = ?");
        bind_values.push(Value::Text(title.clone()));
        assignments.push("slug = ?");
        bind_values.push(Value::Text(slugify(title)));
    }
    if let Some(value) = patch.short_description.as_ref() {
        assignments.push("short_description = ?");
        bind_values.push(Value::Text(value.clone()));
    }
    if let Some(value) = patch.long_description.as_ref() {
        assignments.push("long_description = ?");
        bind_values.push(Value::Text(value.clone()));
    }

    let nullable_columns = [
        ("thumbnail_url = ?", &patch.thumbnail_url),
        ("github_url = ?", &patch.github_url),
        ("demo_url = ?", &patch.demo_url),
        ("docs_url = ?", &patch.docs_url),
        ("video_url = ?", &patch.video_url),
    ];
    for (assignment, value) in nullable_columns {
        if let Some(value) = value {
            assignments.push(assignment);
            bind_values.push(optional_text(value.as_deref()));
        }
    }

    if let Some(is_featured) = patch.is_featured {
        assignments.push("is_featured = ?");
        bind_values.push(Value::Integer(bool_to_int(is_featured)));
    }
    if let Some(display_order) = patch.display_order {
        assignments.push("display_order = ?");
        bind_values.push(Value::Integer(display_order));
    }

    assignments.push("updated_at = ?");
    bind_values.push(Value::Integer(now_epoch_ms()));
    bind_values.push(Value::Text(id.to_string()));

    let sql = format!(
        "UPDATE projects SET {} WHERE id = ?;",
        assignments.join(", ")
    );
    let changed = conn.execute(&sql, params_from_iter(bind_values))?;
    if changed == 0 {
        return Err(RepoError::ProjectNotFound(id));
    }
    Ok(())
}

fn replace_links(conn: &Connection, link: Link, id: ProjectId, ids: &[Uuid]) -> RepoResult<()> {
    conn.execute(
        &format!("DELETE FROM {} WHERE project_id = ?1;", link.table()),
        [id.to_string()],
    )?;
    insert_links(conn, link, id, ids)
}

/// Inserts all links in one statement; duplicate ids collapse.
///
/// Targets travel as a single JSON array parameter, so any number of ids
/// fits in one statement.
fn insert_links(conn: &Connection, link: Link, id: ProjectId, ids: &[Uuid]) -> RepoResult<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let sql = format!(
        "INSERT INTO {} (project_id, {})
         SELECT DISTINCT ?1, value FROM json_each(?2);",
        link.table(),
        link.column(),
    );
    conn.execute(&sql, params![id.to_string(), json_id_array(ids)])?;
    Ok(())
}

fn load_hydrated(conn: &Connection, id: ProjectId) -> RepoResult<ProjectWithRelations> {
    let project = load_project(conn, id)?.ok_or(RepoError::ProjectNotFound(id))?;
    attach_relations(conn, vec![project])?
        .pop()
        .ok_or(RepoError::ProjectNotFound(id))
}

fn load_project(conn: &Connection, id: ProjectId) -> RepoResult<Option<Project>> {
    let mut projects = query_projects(
        conn,
        &format!("{PROJECT_SELECT_SQL} WHERE id = ?;"),
        vec![Value::Text(id.to_string())],
    )?;
    Ok(projects.pop())
}

fn query_projects(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<Project>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut projects = Vec::new();
    while let Some(row) = rows.next()? {
        projects.push(parse_project_row(row)?);
    }
    Ok(projects)
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;
    Ok(Project {
        id: parse_uuid(&id_text, "projects.id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        short_description: row.get("short_description")?,
        long_description: row.get("long_description")?,
        thumbnail_url: row.get("thumbnail_url")?,
        github_url: row.get("github_url")?,
        demo_url: row.get("demo_url")?,
        docs_url: row.get("docs_url")?,
        video_url: row.get("video_url")?,
        is_featured: parse_bool(row.get("is_featured")?, "projects.is_featured")?,
        display_order: row.get("display_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
