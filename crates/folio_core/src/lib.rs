//! Core domain logic for the Folio portfolio catalog.
//! This crate is the single source of truth for project aggregate invariants:
//! the featured cap, display-order swaps and replace-all relation sets.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod slug;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::project::{
    Project, ProjectId, ProjectInsert, ProjectUpdate, ProjectWithRelations,
    FEATURED_PROJECT_LIMIT,
};
pub use model::taxonomy::{
    Category, CategoryId, NewCategory, NewSkill, Skill, SkillId, SkillType,
};
pub use model::ValidationError;
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::error::{RepoError, RepoResult};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::relations::attach_relations;
pub use repo::skill_repo::{SkillRepository, SqliteSkillRepository};
pub use service::project_service::{ProjectService, DEFAULT_FEATURED_LIMIT};
pub use slug::slugify;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
