//! Connection readiness checks and column codecs shared by repositories.
//!
//! # Invariants
//! - Repositories only accept connections at the latest migrated version.
//! - UUID and boolean columns are decoded strictly; malformed values are
//!   reported as `InvalidData` instead of being masked.

use crate::db::migrations::{current_user_version, latest_version};
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Table plus the columns a repository reads or writes.
pub(crate) struct TableRequirement {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

pub(crate) const CATEGORIES_TABLE: TableRequirement = TableRequirement {
    table: "categories",
    columns: &["id", "name", "slug", "description", "is_visible", "created_at"],
};

pub(crate) const SKILLS_TABLE: TableRequirement = TableRequirement {
    table: "skills",
    columns: &["id", "name", "slug", "type", "icon", "category_id", "created_at"],
};

pub(crate) const PROJECTS_TABLE: TableRequirement = TableRequirement {
    table: "projects",
    columns: &[
        "id",
        "title",
        "slug",
        "short_description",
        "long_description",
        "thumbnail_url",
        "github_url",
        "demo_url",
        "docs_url",
        "video_url",
        "is_featured",
        "display_order",
        "created_at",
        "updated_at",
    ],
};

pub(crate) const PROJECT_SKILLS_TABLE: TableRequirement = TableRequirement {
    table: "project_skills",
    columns: &["project_id", "skill_id"],
};

pub(crate) const PROJECT_CATEGORIES_TABLE: TableRequirement = TableRequirement {
    table: "project_categories",
    columns: &["project_id", "category_id"],
};

pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    requirements: &[TableRequirement],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for requirement in requirements {
        if !table_exists(conn, requirement.table)? {
            return Err(RepoError::MissingRequiredTable(requirement.table));
        }
        for &column in requirement.columns {
            if !table_has_column(conn, requirement.table, column)? {
                return Err(RepoError::MissingRequiredColumn {
                    table: requirement.table,
                    column,
                });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn optional_text(value: Option<&str>) -> Value {
    match value {
        Some(text) => Value::Text(text.to_string()),
        None => Value::Null,
    }
}

/// JSON array text of `ids`, bound as one parameter and expanded in SQL
/// with `json_each`.
pub(crate) fn json_id_array<'a>(ids: impl IntoIterator<Item = &'a Uuid>) -> String {
    let texts: Vec<String> = ids.into_iter().map(Uuid::to_string).collect();
    serde_json::Value::from(texts).to_string()
}

/// Current wall clock in epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
