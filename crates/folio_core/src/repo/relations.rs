//! Bulk relation attachment for loaded project rows.
//!
//! # Responsibility
//! - Hydrate any number of projects with their skills and categories.
//!
//! # Invariants
//! - Non-empty input costs exactly two queries (one per relation), however
//!   many projects are passed in.
//! - Empty input issues no query at all.
//! - Output preserves input order; relations are sorted by name, then id.

use crate::model::project::{Project, ProjectId, ProjectWithRelations};
use crate::model::taxonomy::{Category, Skill};
use crate::repo::category_repo::parse_category_row;
use crate::repo::error::RepoResult;
use crate::repo::schema::{json_id_array, parse_uuid};
use crate::repo::skill_repo::parse_skill_row;
use rusqlite::Connection;
use std::collections::HashMap;

/// Attaches skill and category sets to every project in `projects`.
pub fn attach_relations(
    conn: &Connection,
    projects: Vec<Project>,
) -> RepoResult<Vec<ProjectWithRelations>> {
    if projects.is_empty() {
        return Ok(Vec::new());
    }

    // Ids travel as one JSON array parameter; SQLite caps `?` slots per statement.
    let project_ids = json_id_array(projects.iter().map(|project| &project.id));
    let skills_by_project = load_skills_by_project(conn, &project_ids)?;
    let categories_by_project = load_categories_by_project(conn, &project_ids)?;

    Ok(projects
        .into_iter()
        .map(|project| {
            let skills = skills_by_project
                .get(&project.id)
                .cloned()
                .unwrap_or_default();
            let categories = categories_by_project
                .get(&project.id)
                .cloned()
                .unwrap_or_default();
            ProjectWithRelations {
                project,
                skills,
                categories,
            }
        })
        .collect())
}

fn load_skills_by_project(
    conn: &Connection,
    project_ids: &str,
) -> RepoResult<HashMap<ProjectId, Vec<Skill>>> {
    let mut stmt = conn.prepare(
        "SELECT
            ps.project_id AS project_id,
            s.id AS id,
            s.name AS name,
            s.slug AS slug,
            s.type AS type,
            s.icon AS icon,
            s.category_id AS category_id
         FROM project_skills ps
         INNER JOIN skills s ON s.id = ps.skill_id
         WHERE ps.project_id IN (SELECT value FROM json_each(?1))
         ORDER BY s.name COLLATE NOCASE ASC, s.id ASC;",
    )?;
    let mut rows = stmt.query([project_ids])?;

    let mut grouped: HashMap<ProjectId, Vec<Skill>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let project_id_text: String = row.get("project_id")?;
        let project_id = parse_uuid(&project_id_text, "project_skills.project_id")?;
        grouped
            .entry(project_id)
            .or_default()
            .push(parse_skill_row(row)?);
    }
    Ok(grouped)
}

fn load_categories_by_project(
    conn: &Connection,
    project_ids: &str,
) -> RepoResult<HashMap<ProjectId, Vec<Category>>> {
    let mut stmt = conn.prepare(
        "SELECT
            pc.project_id AS project_id,
            c.id AS id,
            c.name AS name,
            c.slug AS slug,
            c.description AS description,
            c.is_visible AS is_visible
         FROM project_categories pc
         INNER JOIN categories c ON c.id = pc.category_id
         WHERE pc.project_id IN (SELECT value FROM json_each(?1))
         ORDER BY c.name COLLATE NOCASE ASC, c.id ASC;",
    )?;
    let mut rows = stmt.query([project_ids])?;

    let mut grouped: HashMap<ProjectId, Vec<Category>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let project_id_text: String = row.get("project_id")?;
        let project_id = parse_uuid(&project_id_text, "project_categories.project_id")?;
        grouped
            .entry(project_id)
            .or_default()
            .push(parse_category_row(row)?);
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::attach_relations;
    use crate::db::open_db_in_memory;
    use crate::model::project::{Project, ProjectInsert};
    use crate::model::taxonomy::{NewCategory, NewSkill, SkillType};
    use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
    use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
    use crate::repo::skill_repo::{SkillRepository, SqliteSkillRepository};
    use rusqlite::Connection;
    use std::cell::Cell;

    thread_local! {
        static EXECUTED_STATEMENTS: Cell<usize> = const { Cell::new(0) };
    }

    fn count_statement(_sql: &str) {
        EXECUTED_STATEMENTS.with(|count| count.set(count.get() + 1));
    }

    #[test]
    fn empty_input_issues_no_query() {
        // No schema exists on this connection, so any query would fail.
        let conn = Connection::open_in_memory().unwrap();
        let attached = attach_relations(&conn, Vec::new()).unwrap();
        assert!(attached.is_empty());
    }

    #[test]
    fn non_empty_input_costs_one_query_per_relation() {
        let mut conn = open_db_in_memory().unwrap();
        let projects: Vec<Project> = {
            let rust = SqliteSkillRepository::try_new(&conn)
                .unwrap()
                .create_skill(&NewSkill::new("Rust", SkillType::Language))
                .unwrap();
            let web = SqliteCategoryRepository::try_new(&conn)
                .unwrap()
                .create_category(&NewCategory::new("Web"))
                .unwrap();
            let repo = SqliteProjectRepository::try_new(&conn).unwrap();
            for idx in 0..5 {
                let linked = idx % 2 == 0;
                repo.create(&ProjectInsert {
                    display_order: Some(idx),
                    skill_ids: if linked { vec![rust.id] } else { Vec::new() },
                    category_ids: if linked { vec![web.id] } else { Vec::new() },
                    ..ProjectInsert::new(format!("Project {idx}"))
                })
                .unwrap();
            }
            repo.list()
                .unwrap()
                .into_iter()
                .map(|item| item.project)
                .collect()
        };

        EXECUTED_STATEMENTS.with(|count| count.set(0));
        conn.trace(Some(count_statement));
        let attached = attach_relations(&conn, projects).unwrap();
        conn.trace(None);

        assert_eq!(EXECUTED_STATEMENTS.with(Cell::get), 2);
        assert_eq!(attached.len(), 5);
        let linked = attached
            .iter()
            .filter(|item| item.skills.len() == 1 && item.categories.len() == 1)
            .count();
        assert_eq!(linked, 3);
    }
}
